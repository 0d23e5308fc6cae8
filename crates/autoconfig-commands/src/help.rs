use std::{io, io::Write as _};

use anstream::stream::{AsLockedWrite, RawStream};
use anstyle::{AnsiColor, Color, Style};
use autoconfig::{ConfigEngine, Configurable, source::KeyValueSource};

use crate::{FieldEntry, FieldRef, Printer, collect_fields};

const INDENT: &str = "  ";
const DIMMED: Style = Style::new().dimmed();
const MAIN_NAME: Style = Style::new().bold();
const FIELD: Style = Style::new().underline();
const DEFAULT_VAL: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
const REQUIRED: Style = Style::new()
    .bold()
    .fg_color(Some(Color::Ansi(AnsiColor::Red)));

impl<W: RawStream + AsLockedWrite> Printer<W> {
    /// Prints help on fields of the config type `C`, recursing into nested records. Fields can be filtered
    /// by the supplied predicate.
    ///
    /// Field rules are taken from the metadata cached by the `engine`, and env variable names are resolved
    /// using its prefix.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors.
    pub fn print_help<C: Configurable, S: KeyValueSource>(
        self,
        engine: &ConfigEngine<S>,
        mut filter: impl FnMut(FieldRef<'_>) -> bool,
    ) -> io::Result<()> {
        let mut writer = self.writer;
        let descriptor = C::describe();
        if !descriptor.help.is_empty() {
            for line in descriptor.help.lines() {
                writeln!(&mut writer, "{DIMMED}{line}{DIMMED:#}")?;
            }
            writeln!(&mut writer)?;
        }

        let mut entries = vec![];
        collect_fields(engine, descriptor, "", &mut entries);
        let filtered_fields = entries
            .iter()
            .map(FieldEntry::field_ref)
            .filter(|&field_ref| filter(field_ref));

        for field_ref in filtered_fields {
            field_ref.write_help(&mut writer)?;
            writeln!(&mut writer)?;
        }
        Ok(())
    }
}

impl FieldRef<'_> {
    fn write_help(&self, writer: &mut impl io::Write) -> io::Result<()> {
        if let Some(var_name) = self.var_name {
            writeln!(writer, "{MAIN_NAME}{var_name}{MAIN_NAME:#}")?;
        } else {
            writeln!(writer, "{DIMMED}(not bound){DIMMED:#}")?;
        }
        writeln!(writer, "{INDENT}{FIELD}Path{FIELD:#}: {}", self.path)?;

        let descriptor = self.descriptor;
        writeln!(
            writer,
            "{INDENT}{FIELD}Type{FIELD:#}: {} {DIMMED}[Rust: {}]{DIMMED:#}",
            descriptor.kind,
            descriptor.rust_type.name_in_code()
        )?;

        if let Some(metadata) = self.metadata {
            if metadata.required {
                writeln!(writer, "{INDENT}{REQUIRED}Required{REQUIRED:#}")?;
            }
            if let Some(default) = &metadata.default_value {
                writeln!(
                    writer,
                    "{INDENT}{FIELD}Default{FIELD:#}: {DEFAULT_VAL}{default:?}{DEFAULT_VAL:#}"
                )?;
            }
        }

        if !descriptor.help.is_empty() {
            for line in descriptor.help.lines() {
                writeln!(writer, "{INDENT}{line}")?;
            }
        }
        Ok(())
    }
}
