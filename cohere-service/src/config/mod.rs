pub mod chat_model_config;
