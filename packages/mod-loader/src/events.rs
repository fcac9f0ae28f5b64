use common::event::{EngineEvent, Event, LOAD_THEME, LOAD_WIDGET, expect_name};
use serde_json::Value;

use crate::manifest::ModManifest;

/// `mod-loader_load-theme(manifest, theme)`
#[derive(Debug, Clone, PartialEq)]
pub struct LoadThemeEvent {
    pub manifest: ModManifest,
    pub theme: String,
}

impl Event for LoadThemeEvent {
    fn name(&self) -> &str {
        LOAD_THEME
    }

    fn args(&self) -> Vec<Value> {
        vec![
            serde_json::to_value(&self.manifest).unwrap_or(Value::Null),
            Value::String(self.theme.clone()),
        ]
    }

    fn from_engine_event(e: &EngineEvent) -> anyhow::Result<Self> {
        expect_name(e, LOAD_THEME)?;
        Ok(Self {
            manifest: e.arg_at(0)?,
            theme: e.arg_at(1)?,
        })
    }
}

/// `mod-loader_load-widget(manifest, html)`
#[derive(Debug, Clone, PartialEq)]
pub struct LoadWidgetEvent {
    pub manifest: ModManifest,
    pub html: String,
}

impl Event for LoadWidgetEvent {
    fn name(&self) -> &str {
        LOAD_WIDGET
    }

    fn args(&self) -> Vec<Value> {
        vec![
            serde_json::to_value(&self.manifest).unwrap_or(Value::Null),
            Value::String(self.html.clone()),
        ]
    }

    fn from_engine_event(e: &EngineEvent) -> anyhow::Result<Self> {
        expect_name(e, LOAD_WIDGET)?;
        Ok(Self {
            manifest: e.arg_at(0)?,
            html: e.arg_at(1)?,
        })
    }
}
