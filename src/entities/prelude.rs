pub use super::macro_data::Entity as MacroData;
pub use super::macro_features::Entity as MacroFeatures;
