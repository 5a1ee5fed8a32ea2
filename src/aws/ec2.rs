//! EC2 managed prefix lists over the AWS CLI.
//!
//! Each [`PrefixListApi`] call is one `aws ec2 ... --output json` command.
//! The CLI paginates describe and get-entries itself.

use super::cli::{self, AwsCommand};
use crate::api::{op, PrefixListApi};
use crate::error::SyncError;
use crate::models::{AddressFamily, ManagedList};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// `create-` and `modify-managed-prefix-list` response.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct PrefixListResponse {
    pub prefix_list: ManagedList,
}

/// `describe-managed-prefix-lists` response.
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeResponse {
    #[serde(default)]
    pub prefix_lists: Vec<ManagedList>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct PrefixListEntry {
    pub cidr: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// `get-managed-prefix-list-entries` response.
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
pub struct EntriesResponse {
    #[serde(default)]
    pub entries: Vec<PrefixListEntry>,
}

/// Decode one CLI response, naming the JSON path on failure.
pub fn parse_response<T: DeserializeOwned>(
    operation: &'static str,
    output: &str,
) -> Result<T, SyncError> {
    let mut deserializer = serde_json::Deserializer::from_str(output);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        log::error!("OUTPUT START:\n\n{}\n\nOUTPUT END\n", output);
        SyncError::Decode {
            operation,
            message: format!("path={} error={}", e.path(), e),
        }
    })
}

/// [`PrefixListApi`] backed by the `aws` binary on `PATH`.
///
/// Credentials and region come from the usual AWS CLI chain
/// (env, `~/.aws/config`, instance role) unless overridden here.
#[derive(Debug, Clone, Default)]
pub struct AwsCliPrefixLists {
    region: Option<String>,
    profile: Option<String>,
}

impl AwsCliPrefixLists {
    pub fn new(region: Option<String>, profile: Option<String>) -> Self {
        AwsCliPrefixLists { region, profile }
    }

    fn command(&self, operation: &str) -> AwsCommand {
        AwsCommand::new("ec2", operation)
            .opt_some("region", self.region.as_deref())
            .opt_some("profile", self.profile.as_deref())
            .opt("output", "json")
    }

    fn call<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        cmd: AwsCommand,
    ) -> Result<T, SyncError> {
        let output = cli::run(&cmd).map_err(|e| SyncError::remote(operation, e.to_string()))?;
        parse_response(operation, &output)
    }
}

impl PrefixListApi for AwsCliPrefixLists {
    fn create_managed_list(
        &self,
        name: &str,
        family: AddressFamily,
        max_entries: usize,
        entries: &[String],
    ) -> Result<ManagedList, SyncError> {
        let cmd = self
            .command("create-managed-prefix-list")
            .opt("prefix-list-name", name)
            .opt("address-family", family.as_aws_str())
            .opt("max-entries", max_entries.to_string())
            .cidr_entries("entries", entries);
        let response: PrefixListResponse = self.call(op::CREATE, cmd)?;
        Ok(response.prefix_list)
    }

    fn modify_managed_list(
        &self,
        id: &str,
        current_version: i64,
        add: &[String],
        remove: &[String],
    ) -> Result<ManagedList, SyncError> {
        let cmd = self
            .command("modify-managed-prefix-list")
            .opt("prefix-list-id", id)
            .opt("current-version", current_version.to_string())
            .cidr_entries("add-entries", add)
            .cidr_entries("remove-entries", remove);
        let response: PrefixListResponse = self.call(op::MODIFY, cmd)?;
        Ok(response.prefix_list)
    }

    fn resize_managed_list(
        &self,
        id: &str,
        current_version: i64,
        max_entries: usize,
    ) -> Result<ManagedList, SyncError> {
        let cmd = self
            .command("modify-managed-prefix-list")
            .opt("prefix-list-id", id)
            .opt("current-version", current_version.to_string())
            .opt("max-entries", max_entries.to_string());
        let response: PrefixListResponse = self.call(op::MODIFY, cmd)?;
        Ok(response.prefix_list)
    }

    fn describe_managed_lists(&self, id: Option<&str>) -> Result<Vec<ManagedList>, SyncError> {
        let cmd = self
            .command("describe-managed-prefix-lists")
            .opt_some("prefix-list-ids", id);
        let response: DescribeResponse = self.call(op::DESCRIBE, cmd)?;
        Ok(response.prefix_lists)
    }

    fn get_managed_list_entries(&self, id: &str) -> Result<Vec<String>, SyncError> {
        let cmd = self
            .command("get-managed-prefix-list-entries")
            .opt("prefix-list-id", id);
        let response: EntriesResponse = self.call(op::GET_ENTRIES, cmd)?;
        Ok(response.entries.into_iter().map(|e| e.cidr).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_data(file: &str) -> String {
        std::fs::read_to_string(format!("src/tests/test_data/{file}"))
            .expect("Error reading test data")
    }

    #[test]
    fn test_parse_create_response() {
        let response: PrefixListResponse =
            parse_response(op::CREATE, &test_data("create_managed_prefix_list.json"))
                .expect("Error parsing create response");
        let list = response.prefix_list;
        assert_eq!(list.prefix_list_id, "pl-0123456789abcdef0");
        assert_eq!(list.version, 1);
        assert_eq!(list.max_entries, 250);
        assert!(list.state.is_in_progress());
    }

    #[test]
    fn test_parse_modify_response() {
        let response: PrefixListResponse =
            parse_response(op::MODIFY, &test_data("modify_managed_prefix_list.json"))
                .expect("Error parsing modify response");
        assert_eq!(response.prefix_list.version, 3);
        assert_eq!(response.prefix_list.state.as_str(), "modify-in-progress");
    }

    #[test]
    fn test_parse_describe_response() {
        let response: DescribeResponse =
            parse_response(op::DESCRIBE, &test_data("describe_managed_prefix_lists.json"))
                .expect("Error parsing describe response");
        let lists = response.prefix_lists;
        assert_eq!(lists.len(), 3);
        assert_eq!(lists[0].prefix_list_name, "com.amazonaws.us-east-1.s3");
        assert_eq!(lists[0].version, 0, "AWS managed lists carry no version");
        assert_eq!(lists[1].prefix_list_name, "office-ipv4");
        assert_eq!(lists[1].version, 4);
        assert_eq!(lists[2].address_family, AddressFamily::V6);
        assert!(lists[2].state.is_failed());
        assert!(lists[2].state_message.is_some());
    }

    #[test]
    fn test_parse_entries_response() {
        let response: EntriesResponse = parse_response(
            op::GET_ENTRIES,
            &test_data("get_managed_prefix_list_entries.json"),
        )
        .expect("Error parsing entries response");
        let cidrs: Vec<String> = response.entries.into_iter().map(|e| e.cidr).collect();
        assert_eq!(cidrs, vec!["10.0.0.0/24", "10.0.1.0/24", "192.168.0.0/16"]);
    }

    #[test]
    fn test_parse_error_names_path() {
        let err = parse_response::<DescribeResponse>(
            op::DESCRIBE,
            r#"{"PrefixLists": [{"PrefixListId": "pl-1", "PrefixListName": "x", "AddressFamily": "IPv5", "State": "create-complete"}]}"#,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("PrefixLists[0].AddressFamily"), "{message}");
    }

    #[test]
    fn test_command_carries_region_and_profile() {
        let api = AwsCliPrefixLists::new(Some("eu-west-1".to_string()), Some("prod".to_string()));
        let cmd = api.command("describe-managed-prefix-lists");
        assert_eq!(
            cmd.to_string(),
            "aws ec2 describe-managed-prefix-lists --region eu-west-1 --profile prod --output json"
        );
    }
}
