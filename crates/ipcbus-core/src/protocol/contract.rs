//! The protocol contract: a closed table of message types.
//!
//! Each entry binds a wire name to one request payload type and one
//! response shape. The table exists twice: as the fieldless `MessageType`
//! enum (runtime name lookup) and as one zero-sized marker type per entry
//! implementing `Contract` (compile-time pairing of handlers and payloads).
//! Adding an entry is one line in the `protocol!` invocation below.

use serde::{de::DeserializeOwned, Serialize};

use crate::protocol::shape::{
    Deferred, FireAndForget, ResponseKind, ResponseShape, Single, Streaming,
};
use crate::protocol::types::{
    AddDocsRequest, AddModelRequest, AutocompleteRequest, CommandRunRequest, ContextItem,
    ContextSubmenuItem, DevDataLogRequest, GetContextItemsRequest, IdRequest, LlmCompleteRequest,
    LlmStreamChatRequest, PersistedSessionInfo, SessionInfo, TitleRequest,
};

/// Compile-time binding of one contract entry.
pub trait Contract: Send + Sync + 'static {
    const TYPE: MessageType;
    type Request: Serialize + DeserializeOwned + Send + 'static;
    type Response: ResponseShape;

    fn name() -> &'static str {
        Self::TYPE.as_str()
    }
}

macro_rules! protocol {
    ($( $(#[$meta:meta])* $marker:ident => $name:literal : $req:ty => $shape:ty; )*) => {
        /// Every message type known to the contract.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MessageType {
            $( $(#[$meta])* $marker, )*
        }

        impl MessageType {
            pub const ALL: &'static [MessageType] = &[$( MessageType::$marker, )*];

            /// Wire name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( MessageType::$marker => $name, )*
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $( $name => Some(MessageType::$marker), )*
                    _ => None,
                }
            }

            pub fn response_kind(self) -> ResponseKind {
                match self {
                    $( MessageType::$marker => <$shape as ResponseShape>::KIND, )*
                }
            }
        }

        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default)]
            pub struct $marker;

            impl Contract for $marker {
                const TYPE: MessageType = MessageType::$marker;
                type Request = $req;
                type Response = $shape;
            }
        )*
    };
}

protocol! {
    /// Host switched the active model.
    UpdateModelChange => "update/modelChange": String => FireAndForget;
    /// Stop whatever the worker is generating.
    Abort => "abort": () => FireAndForget;

    HistoryList => "history/list": () => Single<Vec<SessionInfo>>;
    HistoryDelete => "history/delete": IdRequest => FireAndForget;
    HistoryLoad => "history/load": IdRequest => Single<PersistedSessionInfo>;
    HistorySave => "history/save": PersistedSessionInfo => FireAndForget;

    DevDataLog => "devdata/log": DevDataLogRequest => FireAndForget;

    ConfigAddOpenAiKey => "config/addOpenAiKey": String => FireAndForget;
    ConfigAddModel => "config/addModel": AddModelRequest => FireAndForget;
    ConfigDeleteModel => "config/deleteModel": TitleRequest => FireAndForget;
    ConfigReload => "config/reload": () => FireAndForget;

    ContextGetContextItems => "context/getContextItems":
        GetContextItemsRequest => Deferred<Vec<ContextItem>>;
    ContextLoadSubmenuItems => "context/loadSubmenuItems":
        TitleRequest => Deferred<Vec<ContextSubmenuItem>>;
    ContextAddDocs => "context/addDocs": AddDocsRequest => FireAndForget;

    AutocompleteComplete => "autocomplete/complete": AutocompleteRequest => Single<Vec<String>>;

    CommandRun => "command/run": CommandRunRequest => Streaming<String>;
    LlmComplete => "llm/complete": LlmCompleteRequest => Streaming<String>;
    LlmStreamComplete => "llm/streamComplete": LlmCompleteRequest => Streaming<String>;
    LlmStreamChat => "llm/streamChat": LlmStreamChatRequest => Streaming<String>;
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
