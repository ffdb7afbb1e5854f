pub mod gate;
pub mod headers;
pub mod upstream;

pub use gate::wait_for_upstream;
pub use headers::{apply_forwarding_headers, strip_hop_by_hop};
pub use upstream::UpstreamClient;
