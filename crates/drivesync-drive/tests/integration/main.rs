//! Integration tests for drivesync-drive
//!
//! Uses wiremock to simulate the Google Drive v3 API and verifies the
//! client, the IRemoteStore adapter and token refresh end to end.

mod common;

mod test_folders;
mod test_token_refresh;
mod test_transfers;
