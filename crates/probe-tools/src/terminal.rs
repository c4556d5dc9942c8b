//! Console command tool.

use probe_core::BridgeError;
use probe_scene::SceneError;
use serde_json::{Value as Json, json};
use tracing::debug;

use crate::tools::{finish, success};
use crate::{BridgeTools, RunCommandArgs, ToolError};

impl BridgeTools {
    /// Queue a console command for the next host tick.
    ///
    /// Replies as soon as the command is queued; its output lands in the
    /// console history, not in the reply.
    pub fn run_command(&self, args: RunCommandArgs) -> Json {
        finish("run_command", self.queue_command(args.command))
    }

    fn queue_command(&self, command: String) -> Result<Json, ToolError> {
        if !self.query(|world, _| world.console().is_some())? {
            return Err(SceneError::NotAvailable("Console").into());
        }

        let line = command.clone();
        let queued = self.host().enqueue(move |world| {
            if let Err(err) = world.run_console_command(&line) {
                debug!(command = line, %err, "queued command failed");
            }
        });
        if !queued {
            return Err(BridgeError::ChannelDisconnected.into());
        }
        success(json!({
            "command": command,
            "queued": true,
        }))
    }
}
