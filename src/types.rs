use serde_json::Value;
use smallvec::SmallVec;

pub type ParamEntry = (String, Value);

/// Ordered parameter map; actions receive its values positionally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: SmallVec<[ParamEntry; 4]>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<K: Into<String>, V: Into<Value>>(mut self, name: K, value: V) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, name: K, value: V) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(existing, _)| existing == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub(crate) fn underlay(mut self, lower: Params) -> Self {
        for (name, value) in lower.entries {
            if !self.contains(&name) {
                self.entries.push((name, value));
            }
        }
        self
    }

    pub(crate) fn retain<F: FnMut(&str, &Value) -> bool>(&mut self, mut keep: F) {
        self.entries.retain(|(name, value)| keep(name, value));
    }

    pub(crate) fn to_object(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

impl IntoIterator for Params {
    type Item = ParamEntry;
    type IntoIter = smallvec::IntoIter<[ParamEntry; 4]>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub(crate) usize);

impl RouteId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Outcome of a successful match. `clean_params` hold values after default
/// substitution and type coercion; `params` hold them after the binder chain.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    path: String,
    params: Params,
    clean_params: Params,
}

impl RouteMatch {
    pub fn new(path: impl Into<String>, params: Params, clean_params: Params) -> Self {
        Self {
            path: path.into(),
            params,
            clean_params,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn clean_params(&self) -> &Params {
        &self.clean_params
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn clean_param(&self, name: &str) -> Option<&Value> {
        self.clean_params.get(name)
    }

    /// Keeps this match's params first and appends the group's params it does
    /// not declare itself; takes the group's full path.
    pub(crate) fn nest_under(self, path: &str, params: Params, clean_params: Params) -> Self {
        RouteMatch::new(
            path,
            self.params.underlay(params),
            self.clean_params.underlay(clean_params),
        )
    }
}
