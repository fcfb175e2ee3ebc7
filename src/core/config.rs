mod env;
mod secret;
mod sections;
mod settings;

pub(crate) use settings::Settings;
