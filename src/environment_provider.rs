// environment_provider.rs — Source of the FILEMETA settings variables
//
// Config and the log filter read FILEMETA and FILEMETA_LOG through this
// trait, so the switch parsing can run against preset values.

pub trait EnvironmentProvider {
    /// Value of `name`, or None when the variable is unset or not Unicode.
    fn get_env_var(&self, name: &str) -> Option<String>;
}





/// The process environment the tool was launched with.
pub struct DefaultEnvironmentProvider;



impl EnvironmentProvider for DefaultEnvironmentProvider {
    fn get_env_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}





/// Preset FILEMETA / FILEMETA_LOG values for config tests.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct FixedEnvironmentProvider {
    vars: std::collections::HashMap<String, String>,
}



#[cfg(test)]
impl FixedEnvironmentProvider {
    pub fn new() -> Self {
        Self::default()
    }



    pub fn set(&mut self, name: &str, value: &str) {
        self.vars.insert(name.into(), value.into());
    }
}



#[cfg(test)]
impl EnvironmentProvider for FixedEnvironmentProvider {
    fn get_env_var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
