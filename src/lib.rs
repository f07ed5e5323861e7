pub mod core;

pub use crate::core::{
    config::{Credentials, GlobalConfig, SharedConfig},
    errors::{DispatchError, NormalizedError, TransportError},
    kernel::{Dispatcher, DispatcherBuilder, ReqwestTransport},
    legacy::LegacyRequest,
    traits::{CurrentUserProvider, Router, Transport},
    types::{AuthOptions, CurrentUser, Platform, RequestDescriptor},
};
