//! External [`UserMediaMock`] API for `wasm32-unknown-unknown` target,
//! designed to be used in a web environment with JavaScript.

mod mock_error;
mod mock_options;
mod user_media_mock;

#[doc(inline)]
pub use self::{
    mock_error::MockError, mock_options::MockOptions,
    user_media_mock::UserMediaMock,
};
