pub mod cart;
pub mod metadata;
pub mod webhook;

pub use cart::{
    CartLineRequest, CustomerDraft, LineItemDetails, Participant, PostalAddress, ValidatedCart,
    ValidatedLineItem,
};
pub use metadata::IntentMetadata;
pub use webhook::{PaymentIntentObject, WebhookEvent};
