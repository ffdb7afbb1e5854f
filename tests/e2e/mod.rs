// End-to-end tests for the patients gateway
//
// Every test talks real HTTP on loopback:
// - `FakeApi` is an in-process axum app standing in for the patients API.
//   It issues opaque tokens, lets a test expire or revoke them, and counts
//   every call so refresh and retry behaviour can be asserted exactly.
// - `ApiContext` points the SDK client straight at the fake API.
// - `ProxyContext` puts the reverse proxy in front of the fake API with a
//   temporary static directory.
//
// Each test gets its own servers on ephemeral ports, so tests run in parallel.

mod test_health;
mod test_retry;
mod test_session;
