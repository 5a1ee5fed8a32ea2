//! AWS CLI interaction.
//!
//! - [`cli`] - building and running `aws` commands
//! - [`ec2`] - [`crate::api::PrefixListApi`] over `aws ec2`

mod cli;
mod ec2;

pub use cli::{run, AwsCommand};
pub use ec2::{parse_response, AwsCliPrefixLists};
