use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use gpui::*;
use gpui_component::{Theme, ThemeMode, ThemeRegistry};
use ollama_chat_llm::{DEFAULT_ENDPOINT, DEFAULT_MODEL, ProviderConfig};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::{ResultExt, Snafu};

pub const SETTINGS_DIRECTORY_NAME: &str = "ollama-chat";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
/// Environment variables with this prefix override file values, e.g. `OLLAMA_CHAT_MODEL`.
pub const SETTINGS_ENV_PREFIX: &str = "OLLAMA_CHAT_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(
        default = "default_theme_mode",
        serialize_with = "serialize_theme_mode",
        deserialize_with = "deserialize_theme_mode"
    )]
    pub theme_mode: ThemeMode,
    #[serde(default)]
    pub theme_name: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            theme_mode: default_theme_mode(),
            theme_name: String::new(),
        }
    }
}

impl ChatSettings {
    pub fn to_provider_config(&self) -> ProviderConfig {
        ProviderConfig::new(&self.endpoint, &self.model)
    }

    pub fn normalized(mut self) -> Self {
        self.endpoint = if self.endpoint.trim().is_empty() {
            default_endpoint()
        } else {
            self.endpoint.trim().to_string()
        };
        self.model = if self.model.trim().is_empty() {
            default_model()
        } else {
            self.model.trim().to_string()
        };
        self.theme_name = self.theme_name.trim().to_string();
        self
    }

    pub fn with_theme_mode(mut self, theme_mode: ThemeMode) -> Self {
        self.theme_mode = theme_mode;
        self
    }

    /// Copies onto `self` only the fields that differ between `before` and `after`.
    ///
    /// Used to write an edit back over the file layer without pulling in
    /// values that came from the environment.
    fn with_changes(mut self, before: &ChatSettings, after: &ChatSettings) -> Self {
        if before.endpoint != after.endpoint {
            self.endpoint = after.endpoint.clone();
        }
        if before.model != after.model {
            self.model = after.model.clone();
        }
        if before.theme_mode != after.theme_mode {
            self.theme_mode = after.theme_mode;
        }
        if before.theme_name != after.theme_name {
            self.theme_name = after.theme_name.clone();
        }
        self
    }

    pub fn apply_theme(&self, window: Option<&mut Window>, cx: &mut App) {
        if let Some(theme_config) = ThemeRegistry::global(cx)
            .themes()
            .get(&SharedString::from(self.theme_name.trim().to_string()))
            .cloned()
        {
            let mode = theme_config.mode;
            let theme = Theme::global_mut(cx);
            if mode.is_dark() {
                theme.dark_theme = theme_config;
            } else {
                theme.light_theme = theme_config;
            }
            Theme::change(mode, window, cx);
            return;
        }

        Theme::change(self.theme_mode, window, cx);
    }
}

pub struct SettingsStore {
    settings: Arc<ArcSwap<ChatSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".ollama-chat"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_from_disk(&config_path);
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn settings(&self) -> Arc<ChatSettings> {
        self.settings.load_full()
    }

    /// Applies `settings` in memory and writes the edited fields to disk.
    ///
    /// Environment overrides stay in effect for this process but are never persisted.
    pub fn update(&self, settings: ChatSettings) -> Result<(), SettingsError> {
        let normalized_settings = settings.normalized();
        let current = self.settings();
        let file_settings = Self::load_file_layer(&self.config_path).with_changes(
            &current,
            &normalized_settings,
        );

        self.persist(&file_settings)?;
        self.settings.store(Arc::new(normalized_settings));
        Ok(())
    }

    fn file_figment(path: &Path) -> Figment {
        let figment = Figment::from(Serialized::defaults(ChatSettings::default()));
        if path.exists() {
            figment.merge(Json::file(path))
        } else {
            tracing::info!("settings file not found at {:?}, using defaults", path);
            figment
        }
    }

    fn load_file_layer(path: &Path) -> ChatSettings {
        match Self::file_figment(path).extract::<ChatSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    "failed to parse settings from {:?}: {}. rewriting from defaults",
                    path,
                    error
                );
                ChatSettings::default()
            }
        }
    }

    fn load_from_disk(path: &Path) -> ChatSettings {
        let figment = Self::file_figment(path).merge(Env::prefixed(SETTINGS_ENV_PREFIX));

        match figment.extract::<ChatSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    "failed to parse settings from {:?}: {}. using defaults",
                    path,
                    error
                );
                ChatSettings::default()
            }
        }
    }

    fn persist(&self, settings: &ChatSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-settings-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(settings).context(SerializeConfigSnafu {
            stage: "serialize-settings-json",
        })?;

        let temp_path = self.config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-settings-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.config_path).context(RenameTempFileSnafu {
            stage: "rename-temporary-settings-file",
            from: temp_path,
            to: self.config_path.clone(),
        })?;

        tracing::info!("saved settings to {:?}", self.config_path);
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to create settings directory at {path:?} on `{stage}`: {source}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize settings on `{stage}`: {source}"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write settings file at {path:?} on `{stage}`: {source}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "failed to replace settings file from {from:?} to {to:?} on `{stage}`: {source}"
    ))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// GPUI entity owning the settings store; emits [`SettingsChanged`] after each saved update.
pub struct SettingsState {
    store: SettingsStore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsChanged {
    pub settings: ChatSettings,
}

impl EventEmitter<SettingsChanged> for SettingsState {}

impl SettingsState {
    pub fn new(cx: &mut App) -> Entity<Self> {
        cx.new(|_| Self {
            store: SettingsStore::load(),
        })
    }

    pub fn settings(&self) -> Arc<ChatSettings> {
        self.store.settings()
    }

    pub fn update_settings(
        &mut self,
        settings: ChatSettings,
        cx: &mut Context<Self>,
    ) -> Result<(), SettingsError> {
        let normalized_settings = settings.normalized();
        self.store.update(normalized_settings.clone())?;
        cx.emit(SettingsChanged {
            settings: normalized_settings,
        });
        cx.notify();
        Ok(())
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_theme_mode() -> ThemeMode {
    ThemeMode::Light
}

fn serialize_theme_mode<S>(value: &ThemeMode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.name())
}

fn deserialize_theme_mode<'de, D>(deserializer: D) -> Result<ThemeMode, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(parse_theme_mode(&value))
}

fn parse_theme_mode(value: &str) -> ThemeMode {
    if value.trim().eq_ignore_ascii_case("dark") {
        ThemeMode::Dark
    } else {
        ThemeMode::Light
    }
}
