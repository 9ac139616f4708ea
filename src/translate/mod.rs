pub mod decoder;
pub mod encoder;
pub mod factory;
pub mod google;
pub mod interface;
pub mod pinyin;
pub mod service;

pub use interface::{DecodeMode, LanguageCode, TranslateOutcome, TranslationQuery};
pub use factory::TranslatorFactory;
pub use service::Translator;
