use serde_json::{json, Value};

pub const STATUS_COMMAND: &str = "status";
pub const HELP_COMMAND: &str = "help";

/// Global slash commands, registered in bulk at startup
pub fn command_definitions() -> Value {
    json!([
        {
            "name": STATUS_COMMAND,
            "description": "Check the current status of the Minecraft server",
            "type": 1
        },
        {
            "name": HELP_COMMAND,
            "description": "Show help information about the bot",
            "type": 1
        }
    ])
}
