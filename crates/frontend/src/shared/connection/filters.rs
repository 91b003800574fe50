//! Декларативные фильтры и слияние выбранных значений в аргументы запроса.

use std::collections::{BTreeMap, HashSet};

use contracts::shared::connection::QueryArguments;
use serde::{Deserialize, Serialize};

use super::error::ConnectionError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Ровно одно значение из `values`.
    #[default]
    Select,
}

/// Одно значение фильтра.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterValue {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub tooltip: Option<String>,
    /// Добавляются в каждый запрос, пока значение выбрано.
    #[serde(default)]
    pub args: QueryArguments,
}

impl FilterValue {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            tooltip: None,
            args: QueryArguments::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.args.insert(key, value);
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinition {
    pub id: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: FilterKind,
    #[serde(default)]
    pub tooltip: Option<String>,
    /// Первое значение выбрано по умолчанию.
    pub values: Vec<FilterValue>,
}

impl FilterDefinition {
    pub fn select(id: impl Into<String>, label: impl Into<String>, values: Vec<FilterValue>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: FilterKind::Select,
            tooltip: None,
            values,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn default_value(&self) -> Option<&FilterValue> {
        self.values.first()
    }

    pub fn value(&self, value: &str) -> Option<&FilterValue> {
        self.values.iter().find(|v| v.value == value)
    }
}

/// Выбранное значение по id фильтра.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelections(BTreeMap<String, String>);

impl FilterSelections {
    pub fn get(&self, filter_id: &str) -> Option<&str> {
        self.0.get(filter_id).map(String::as_str)
    }
}

/// Набор фильтров списка.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRegistry {
    definitions: Vec<FilterDefinition>,
}

impl FilterRegistry {
    /// Отклоняет повторные id, фильтры без значений и повторные значения внутри фильтра.
    pub fn new(definitions: Vec<FilterDefinition>) -> Result<Self, ConnectionError> {
        let mut ids = HashSet::new();
        for def in &definitions {
            if !ids.insert(def.id.as_str()) {
                return Err(ConnectionError::InvalidFilters(format!(
                    "duplicate filter id {:?}",
                    def.id
                )));
            }
            if def.values.is_empty() {
                return Err(ConnectionError::InvalidFilters(format!(
                    "filter {:?} has no values",
                    def.id
                )));
            }
            let mut values = HashSet::new();
            for v in &def.values {
                if !values.insert(v.value.as_str()) {
                    return Err(ConnectionError::InvalidFilters(format!(
                        "filter {:?} repeats value {:?}",
                        def.id, v.value
                    )));
                }
            }
        }
        Ok(Self { definitions })
    }

    pub fn definitions(&self) -> &[FilterDefinition] {
        &self.definitions
    }

    pub fn default_selections(&self) -> FilterSelections {
        FilterSelections(
            self.definitions
                .iter()
                .filter_map(|def| {
                    def.default_value()
                        .map(|v| (def.id.clone(), v.value.clone()))
                })
                .collect(),
        )
    }

    /// Выбирает `value` для `filter_id`.
    ///
    /// `Ok(false)`, если значение уже выбрано: ничего не изменилось,
    /// перезагрузка не нужна.
    pub fn select(
        &self,
        selections: &mut FilterSelections,
        filter_id: &str,
        value: &str,
    ) -> Result<bool, ConnectionError> {
        let def = self
            .definitions
            .iter()
            .find(|d| d.id == filter_id)
            .ok_or_else(|| ConnectionError::UnknownFilter(filter_id.to_string()))?;
        if def.value(value).is_none() {
            return Err(ConnectionError::UnknownFilterValue {
                filter: filter_id.to_string(),
                value: value.to_string(),
            });
        }
        if self.selected_value(selections, filter_id).map(|v| v.value.as_str()) == Some(value) {
            return Ok(false);
        }
        selections.0.insert(filter_id.to_string(), value.to_string());
        Ok(true)
    }

    /// Выбранное значение фильтра или значение по умолчанию.
    pub fn selected_value<'a>(
        &'a self,
        selections: &FilterSelections,
        filter_id: &str,
    ) -> Option<&'a FilterValue> {
        let def = self.definitions.iter().find(|d| d.id == filter_id)?;
        selections
            .get(filter_id)
            .and_then(|v| def.value(v))
            .or_else(|| def.default_value())
    }

    /// Аргументы всех выбранных значений в порядке объявления фильтров.
    ///
    /// Более поздний фильтр перекрывает ранний по тому же ключу.
    pub fn merged_args(&self, selections: &FilterSelections) -> QueryArguments {
        let mut args = QueryArguments::new();
        for def in &self.definitions {
            if let Some(value) = self.selected_value(selections, &def.id) {
                args.merge(&value.args);
            }
        }
        args
    }

    /// Все фильтры на значениях по умолчанию.
    pub fn is_default(&self, selections: &FilterSelections) -> bool {
        self.definitions.iter().all(|def| {
            match (self.selected_value(selections, &def.id), def.default_value()) {
                (Some(selected), Some(default)) => selected.value == default.value,
                _ => true,
            }
        })
    }
}
