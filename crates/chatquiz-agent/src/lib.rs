mod command;
mod scripted;
mod spawner;
mod traits;

pub use command::{parse_reply, CommandBackend};
pub use scripted::{Script, ScriptedBackend, ScriptedQuestion, INTAKE_PROMPTS};
pub use spawner::{ProcessOutput, ProcessSpawner};
pub use traits::{Backend, BackendConfig, BackendError, BackendType, Reply};
