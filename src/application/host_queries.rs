//! Typed host queries built on the correlation bridge.
//!
//! Each query pairs a host operation with the listener event that carries its
//! real result.

use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventArgs};

use super::bridge::{CorrelatedCall, EventCorrelationBridge};

pub const GET_GROUP_LIST: &str = "GroupService/getGroupList";
pub const ON_GROUP_LIST_UPDATE: &str = "GroupListener/onGroupListUpdate";
pub const GET_MEMBER_INFO: &str = "GroupService/getMemberInfo";
pub const ON_MEMBER_INFO_CHANGE: &str = "GroupListener/onMemberInfoChange";
pub const FETCH_USER_DETAIL_INFO: &str = "ProfileService/fetchUserDetailInfo";
pub const ON_USER_DETAIL_INFO_CHANGED: &str = "ProfileListener/onUserDetailInfoChanged";
pub const GET_UIN: &str = "UixConvertService/getUin";

const PROFILE_STORE: &str = "BuddyProfileStore";

/// Group and profile lookups against the host.
#[derive(Clone)]
pub struct HostQueries {
    bridge: Arc<EventCorrelationBridge>,
}

impl HostQueries {
    pub fn new(bridge: Arc<EventCorrelationBridge>) -> Self {
        Self { bridge }
    }

    /// Full group list, as delivered by the next group list update
    /// (`updateType, groupList`).
    pub async fn get_groups(&self, forced: bool) -> Result<JsonValue, DomainError> {
        let call = CorrelatedCall::new(GET_GROUP_LIST, ON_GROUP_LIST_UPDATE)
            .with_args(vec![json!(forced)]);
        let result = self.bridge.invoke_awaiting_events(call).await?;

        result
            .first_arg(1)
            .cloned()
            .ok_or_else(|| DomainError::invalid_payload("groupList", "missing from group list update"))
    }

    /// One member of a group.
    ///
    /// Waits for a member-info change on `group_code` whose member map
    /// contains `uid`.
    pub async fn get_group_member(
        &self,
        group_code: &str,
        uid: &str,
        forced: bool,
    ) -> Result<JsonValue, DomainError> {
        let expected_group = group_code.to_string();
        let expected_uid = uid.to_string();
        let call = CorrelatedCall::new(GET_MEMBER_INFO, ON_MEMBER_INFO_CHANGE)
            .with_args(vec![json!(group_code), json!([uid]), json!(forced)])
            .with_predicate(move |args| {
                arg_str(args, 0) == Some(expected_group.as_str())
                    && member_of(args, &expected_uid).is_some()
            });
        let result = self.bridge.invoke_awaiting_events(call).await?;

        result
            .first_match()
            .and_then(|args| member_of(args, uid))
            .cloned()
            .ok_or_else(|| DomainError::invalid_payload("members", "member missing from update"))
    }

    /// Profile of a single user.
    pub async fn fetch_user_detail(&self, uid: &str) -> Result<JsonValue, DomainError> {
        let expected_uid = uid.to_string();
        let call = CorrelatedCall::new(FETCH_USER_DETAIL_INFO, ON_USER_DETAIL_INFO_CHANGED)
            .with_args(vec![json!(PROFILE_STORE), json!([uid])])
            .with_predicate(move |args| profile_uid(args) == Some(expected_uid.as_str()));
        let result = self.bridge.invoke_awaiting_events(call).await?;

        result
            .first_arg(0)
            .cloned()
            .ok_or_else(|| DomainError::invalid_payload("profile", "missing from detail update"))
    }

    /// Profiles of several users, in the order their updates arrived.
    pub async fn fetch_user_details(&self, uids: &[String]) -> Result<Vec<JsonValue>, DomainError> {
        if uids.is_empty() {
            return Ok(Vec::new());
        }

        let wanted = uids.to_vec();
        let call = CorrelatedCall::new(FETCH_USER_DETAIL_INFO, ON_USER_DETAIL_INFO_CHANGED)
            .with_required_matches(uids.len())
            .with_args(vec![json!(PROFILE_STORE), json!(uids)])
            .with_predicate(move |args| {
                profile_uid(args).is_some_and(|uid| wanted.iter().any(|w| w == uid))
            });
        let result = self.bridge.invoke_awaiting_events(call).await?;

        result
            .matches
            .iter()
            .map(|args| {
                args.first()
                    .cloned()
                    .ok_or_else(|| DomainError::invalid_payload("profile", "missing from detail update"))
            })
            .collect()
    }

    /// Numeric account id for `uid`; a direct call, no event involved.
    pub async fn get_uin_by_uid(&self, uid: &str) -> Result<String, DomainError> {
        let value = self
            .bridge
            .invoke_direct_default(GET_UIN, vec![json!([uid])])
            .await
            .map_err(DomainError::from)?;

        match value.get("uinInfo").and_then(|info| info.get(uid)) {
            Some(JsonValue::String(uin)) => Ok(uin.clone()),
            Some(JsonValue::Number(uin)) => Ok(uin.to_string()),
            _ => Err(DomainError::invalid_payload("uinInfo", format!("no uin for {}", uid))),
        }
    }
}

fn arg_str(args: &EventArgs, index: usize) -> Option<&str> {
    args.get(index).and_then(JsonValue::as_str)
}

fn member_of<'a>(args: &'a EventArgs, uid: &str) -> Option<&'a JsonValue> {
    args.get(2).and_then(|members| members.get(uid))
}

fn profile_uid(args: &EventArgs) -> Option<&str> {
    args.first()
        .and_then(|profile| profile.get("uid"))
        .and_then(JsonValue::as_str)
}
