pub mod detection;
pub mod dispatch;
pub mod format;
pub mod gate;
pub mod handlers;
pub mod types;

pub use detection::detect_command;
pub use dispatch::{CommandContext, CommandDispatcher, CommandHandler, DispatchOutcome};
pub use gate::{ActiveCommand, Clock, CommandGate, DropReason, GatePolicy, GateStats, ManualClock, SystemClock};
pub use handlers::{
    BotServices, ChatHandler, HelpHandler, HomeworkHandler, HomeworkHelpHandler, MaterialHandler,
    SolutionHandler,
};
pub use types::{BotCommand, CommandKind, UsageError};

use std::sync::Arc;

/// Build a dispatcher pre-wired with all built-in handlers.
pub fn build_default_dispatcher(
    services: Arc<BotServices>,
    gate: Arc<CommandGate>,
    allowed_channel: Option<String>,
) -> CommandDispatcher {
    let policy = gate.policy().clone();
    let mut dispatcher = CommandDispatcher::new(gate).with_allowed_channel(allowed_channel);

    dispatcher.register(CommandKind::Homework, Arc::new(HomeworkHandler::new(Arc::clone(&services))));
    dispatcher.register(CommandKind::Solution, Arc::new(SolutionHandler::new(Arc::clone(&services))));
    dispatcher.register(CommandKind::Chat, Arc::new(ChatHandler::new(Arc::clone(&services))));
    dispatcher.register(CommandKind::HomeworkHelp, Arc::new(HomeworkHelpHandler::new(Arc::clone(&services))));
    dispatcher.register(CommandKind::Material, Arc::new(MaterialHandler::new(services)));
    dispatcher.register(CommandKind::Help, Arc::new(HelpHandler { policy }));

    dispatcher
}
