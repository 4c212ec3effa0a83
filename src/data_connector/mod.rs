// Data connector module for chat message and conversation storage
pub mod conversation_memory_store;
pub mod conversation_noop_store;
pub mod conversations;
pub mod factory;
pub mod message_memory_store;
pub mod message_noop_store;
pub mod messages;

pub use conversation_memory_store::MemoryConversationStorage;
pub use conversation_noop_store::NoOpConversationStorage;
pub use conversations::{
    Conversation, ConversationId, ConversationStorage, ConversationStorageError,
    NewConversation, Result as ConversationResult, SharedConversationStorage,
};
pub use factory::{create_storage, ChatStorage};
pub use message_memory_store::MemoryMessageStorage;
pub use message_noop_store::NoOpMessageStorage;
pub use messages::{
    ListParams, MessageId, MessageRole, MessageStorage, MessageStorageError, NewMessage,
    Result as MessageResult, SharedMessageStorage, SortOrder, StoredMessage,
};
