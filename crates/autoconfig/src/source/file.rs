use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, ErrorKind, Operation},
    value::{Map, Value, ValueOrigin, WithOrigin, join_path},
};

/// Format of a config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Unspecified format. Not valid for reading files; [`ConfigFile::create()`] replaces it with YAML.
    #[default]
    None,
    /// YAML.
    Yaml,
    /// JSON.
    Json,
}

impl FileFormat {
    /// Returns the lowercase name of this format, which is also used as the file extension.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    /// Checks whether this format can be used to read files.
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "none" => Self::None,
            "yaml" | "yml" => Self::Yaml,
            "json" => Self::Json,
            _ => anyhow::bail!("unknown file format {s:?}; expected one of `yaml`, `json`"),
        })
    }
}

/// Location and format of a config file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    project: String,
    base_name: String,
    dir: PathBuf,
    format: FileFormat,
}

impl ConfigFile {
    /// Sets up a config file location and creates its directory (with `0700` permissions on Unix).
    ///
    /// `project` and `base_name` are lowercased and stripped of chars other than ASCII letters, digits and spaces.
    /// If `dir` is not specified, the file is placed in the `.{project}` directory in the user home dir.
    /// An invalid `format` is replaced with [`FileFormat::Yaml`].
    ///
    /// # Errors
    ///
    /// Returns an error if `project` or `base_name` is empty, the home dir cannot be determined,
    /// or the directory cannot be created.
    pub fn create(
        project: &str,
        base_name: &str,
        dir: Option<&Path>,
        format: FileFormat,
    ) -> Result<Self, Error> {
        let setup_error = |message: &str| Error::new(Operation::Setup, ErrorKind::Setup(message.to_owned()));
        if project.is_empty() {
            return Err(setup_error("missing project name"));
        }
        if base_name.is_empty() {
            return Err(setup_error("missing config base file name"));
        }

        let format = if format.is_valid() {
            format
        } else {
            FileFormat::Yaml
        };
        let project = sanitize_name(project);
        let base_name = sanitize_name(base_name);

        let dir = if let Some(dir) = dir {
            std::path::absolute(dir).map_err(|source| {
                Error::new(
                    Operation::Setup,
                    ErrorKind::Io {
                        path: dir.to_owned(),
                        source,
                    },
                )
            })?
        } else {
            let base_dirs = directories::BaseDirs::new()
                .ok_or_else(|| setup_error("cannot determine home dir"))?;
            default_dir(base_dirs.home_dir(), &project)
        };
        create_dir(&dir).map_err(|source| {
            Error::new(
                Operation::Setup,
                ErrorKind::Io {
                    path: dir.clone(),
                    source,
                },
            )
        })?;
        tracing::debug!(dir = %dir.display(), %format, "Set up config dir");

        Ok(Self {
            project,
            base_name,
            dir,
            format,
        })
    }

    /// Returns the sanitized project name.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Returns the directory containing the file.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file format.
    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Returns the full path to the file, `{dir}/{base_name}.{format}`.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.{}", self.base_name, self.format))
    }

    /// Reads and parses the file into the JSON object model.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, cannot be read or parsed, or its root is not an object.
    pub fn read(&self) -> Result<Map, Error> {
        let path = self.path();
        let raw = fs::read_to_string(&path).map_err(|source| {
            let kind = if source.kind() == io::ErrorKind::NotFound {
                ErrorKind::FileNotFound { path: path.clone() }
            } else {
                ErrorKind::Io {
                    path: path.clone(),
                    source,
                }
            };
            Error::new(Operation::ReadFile, kind)
        })?;

        let filename: Arc<str> = path.to_string_lossy().into();
        let parsed = match self.format {
            FileFormat::Json => parse_json(&raw, &filename),
            FileFormat::Yaml | FileFormat::None => parse_yaml(&raw, &filename),
        };
        parsed.map_err(|source| Error::new(Operation::ReadFile, ErrorKind::FileParse { path, source }))
    }
}

/// Hidden per-project directory in the home dir, e.g. `~/.my app`.
fn default_dir(home_dir: &Path, sanitized_project: &str) -> PathBuf {
    home_dir.join(format!(".{sanitized_project}"))
}

fn sanitize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|&ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == ' ')
        .collect()
}

#[cfg(unix)]
fn create_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt as _;

    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

fn file_origin(filename: &Arc<str>, format: FileFormat, path: &str) -> Arc<ValueOrigin> {
    Arc::new(ValueOrigin::File {
        filename: filename.clone(),
        format,
        path: path.to_owned(),
    })
}

pub(crate) fn parse_json(raw: &str, filename: &Arc<str>) -> anyhow::Result<Map> {
    let value: serde_json::Value = serde_json::from_str(raw).context("invalid JSON")?;
    let serde_json::Value::Object(_) = &value else {
        anyhow::bail!("expected an object at the root of JSON file");
    };
    match map_json_value(value, filename, String::new()).inner {
        Value::Object(map) => Ok(map),
        _ => unreachable!(),
    }
}

fn map_json_value(value: serde_json::Value, filename: &Arc<str>, path: String) -> WithOrigin {
    let inner = match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(value) => Value::Bool(value),
        serde_json::Value::Number(value) => Value::Number(value),
        serde_json::Value::String(value) => Value::String(value),
        serde_json::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| map_json_value(item, filename, join_path(&path, &i.to_string())))
                .collect(),
        ),
        serde_json::Value::Object(items) => Value::Object(
            items
                .into_iter()
                .map(|(key, item)| {
                    let item = map_json_value(item, filename, join_path(&path, &key));
                    (key, item)
                })
                .collect(),
        ),
    };
    WithOrigin::new(inner, file_origin(filename, FileFormat::Json, &path))
}

pub(crate) fn parse_yaml(raw: &str, filename: &Arc<str>) -> anyhow::Result<Map> {
    let value: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid YAML")?;
    let value = match value {
        serde_yaml::Value::Null => return Ok(Map::new()),
        serde_yaml::Value::Mapping(_) => value,
        _ => anyhow::bail!("expected a mapping at the root of YAML file"),
    };
    match map_yaml_value(value, filename, String::new())?.inner {
        Value::Object(map) => Ok(map),
        _ => unreachable!(),
    }
}

fn map_yaml_key(key: serde_yaml::Value, parent_path: &str) -> anyhow::Result<String> {
    Ok(match key {
        serde_yaml::Value::String(value) => value,
        serde_yaml::Value::Number(value) => value.to_string(),
        serde_yaml::Value::Bool(value) => value.to_string(),
        serde_yaml::Value::Null => "null".into(),
        _ => anyhow::bail!(
            "unsupported key type at {parent_path:?}: {key:?}; only primitive value types are supported as keys"
        ),
    })
}

fn map_yaml_number(number: &serde_yaml::Number, path: &str) -> anyhow::Result<serde_json::Number> {
    Ok(if let Some(number) = number.as_u64() {
        number.into()
    } else if let Some(number) = number.as_i64() {
        number.into()
    } else if let Some(number) = number.as_f64() {
        serde_json::Number::from_f64(number)
            .with_context(|| format!("unsupported number at {path:?}: {number:?}"))?
    } else {
        anyhow::bail!("unsupported number at {path:?}: {number:?}")
    })
}

fn map_yaml_value(
    value: serde_yaml::Value,
    filename: &Arc<str>,
    path: String,
) -> anyhow::Result<WithOrigin> {
    let inner = match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(value) => Value::Bool(value),
        serde_yaml::Value::Number(value) => Value::Number(map_yaml_number(&value, &path)?),
        serde_yaml::Value::String(value) => Value::String(value),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| map_yaml_value(item, filename, join_path(&path, &i.to_string())))
                .collect::<anyhow::Result<_>>()?,
        ),
        serde_yaml::Value::Mapping(items) => Value::Object(
            items
                .into_iter()
                .map(|(key, item)| {
                    let key = map_yaml_key(key, &path)?;
                    let child_path = join_path(&path, &key);
                    anyhow::Ok((key, map_yaml_value(item, filename, child_path)?))
                })
                .collect::<anyhow::Result<_>>()?,
        ),
        serde_yaml::Value::Tagged(tagged) => {
            return map_yaml_value(tagged.value, filename, path);
        }
    };
    Ok(WithOrigin::new(inner, file_origin(filename, FileFormat::Yaml, &path)))
}
