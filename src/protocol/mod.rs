/*!
 * Native iRODS protocol client
 *
 * Implements the capability interface from `irods-core-interface` over the
 * XML flavour of the iRODS wire protocol:
 * - `message`: frame layout and message types
 * - `pack`: packing instruction encoding and decoding
 * - `connection`: startup exchange and API request/reply
 * - `auth`: native challenge/response authentication
 * - `client`: access factory, session and data object streams
 */

pub mod api;
pub mod auth;
pub mod client;
pub mod connection;
pub mod message;
pub mod pack;

pub use client::{IrodsFileInputStream, IrodsFileOutputStream, NativeAccessFactory, NativeSession};
pub use connection::{ApiReply, Connection, ServerVersion};
