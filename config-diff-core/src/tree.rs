use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Insertion-ordered attribute map of one configuration object.
///
/// `Value::Null` marks an absent value, `Value::Object` a nested bag, and
/// every other variant a scalar.
pub type PropertyBag = Map<String, Value>;

/// One configuration object: its resource type and attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigItem {
    /// Resource type, e.g. `ltm pool`.
    pub command: String,
    /// Object attributes.
    #[serde(default)]
    pub properties: PropertyBag,
    /// Property names the differ must not compare.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
}

impl ConfigItem {
    /// Create an item with no ignored properties.
    pub fn new(command: impl Into<String>, properties: PropertyBag) -> Self {
        Self {
            command: command.into(),
            properties,
            ignore: Vec::new(),
        }
    }

    /// Walk a nested property path and return the value if found.
    pub fn property(&self, path: &[&str]) -> Option<&Value> {
        lookup(&self.properties, path)
    }
}

/// Configuration objects keyed by full resource path (`/Tenant/App/name`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree {
    items: BTreeMap<String, ConfigItem>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&ConfigItem> {
        self.items.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.items.contains_key(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, item: ConfigItem) -> Option<ConfigItem> {
        self.items.insert(path.into(), item)
    }

    pub fn remove(&mut self, path: &str) -> Option<ConfigItem> {
        self.items.remove(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigItem)> {
        self.items.iter()
    }

    /// Return all items of one resource type, in path order.
    pub fn items_with_command<'a>(
        &'a self,
        command: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a ConfigItem)> + 'a {
        self.items.iter().filter(move |(_, item)| item.command == command)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<(String, ConfigItem)> for ConfigTree {
    fn from_iter<I: IntoIterator<Item = (String, ConfigItem)>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Display for ConfigTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (path, item) in &self.items {
            writeln!(f, "{} {} ({} properties)", item.command, path, item.properties.len())?;
        }
        Ok(())
    }
}

/// Walk a nested bag path and return the terminal value if found.
pub fn lookup<'a>(bag: &'a PropertyBag, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = bag.get(*first)?;
    for segment in rest {
        current = current.as_object()?.get(*segment)?;
    }
    Some(current)
}

/// True when `value` is a nested bag with no keys.
pub fn is_empty_bag(value: &Value) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}

/// Render a scalar value the way it appears on a command line.
///
/// Strings are emitted verbatim, arrays as space-joined scalars, and nested
/// bags as their keys.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(" "),
        Value::Object(map) => map.keys().cloned().collect::<Vec<_>>().join(" "),
    }
}
