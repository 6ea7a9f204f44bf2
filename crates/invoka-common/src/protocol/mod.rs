pub mod error;
pub mod invocation;
pub mod responses;
pub mod url;


pub use error::{InvokaError, Result};
pub use invocation::{CallContext, MethodName, MockLookup, RequestId, RpcArgs};
pub use responses::{Response, RpcResult};
pub use url::{EndpointUrl, INTERFACE_KEY};
