// Shellmarks services
// Services provide id generation, change notification and settings.

pub mod id_generator;
pub mod notifier;
pub mod settings_engine;
