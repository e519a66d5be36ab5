use std::collections::BTreeMap;
use std::path::PathBuf;

use samlocal::config::FunctionConfig;

/// Builder for `FunctionConfig` with the fixture defaults
/// (`handler.handler`, `nodejs14.x`).
pub struct FunctionConfigBuilder {
    function: FunctionConfig,
}

impl FunctionConfigBuilder {
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            function: FunctionConfig::new("handler.handler", "nodejs14.x", filename),
        }
    }

    pub fn handler(mut self, handler: &str) -> Self {
        self.function.handler = handler.to_string();
        self
    }

    pub fn runtime(mut self, runtime: &str) -> Self {
        self.function.runtime = runtime.to_string();
        self
    }

    pub fn route(mut self, path: &str) -> Self {
        self.function.route = Some(path.to_string());
        self
    }

    pub fn named_route(mut self, key: &str, path: &str) -> Self {
        self.function
            .routes
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), path.to_string());
        self
    }

    pub fn method(mut self, method: &str) -> Self {
        self.function.method = Some(method.to_string());
        self
    }

    pub fn memory_size(mut self, mb: u32) -> Self {
        self.function.memory_size = Some(mb);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.function
            .environment
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> FunctionConfig {
        self.function
    }
}

/// Function map from `(name, config)` pairs.
pub fn function_map<I>(entries: I) -> BTreeMap<String, FunctionConfig>
where
    I: IntoIterator<Item = (&'static str, FunctionConfig)>,
{
    entries
        .into_iter()
        .map(|(name, function)| (name.to_string(), function))
        .collect()
}
