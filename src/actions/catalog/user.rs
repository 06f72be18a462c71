use super::TOKEN;
use crate::actions::{ActionDef, Category, Handler, Output, RestCall};

pub(super) const ACTIONS: &[ActionDef] = &[ActionDef {
    name: "circleci_get_user_info",
    category: Category::User,
    description: "Get the user that owns the API token",
    params: &[TOKEN],
    handler: Handler::Rest(RestCall::get("me")),
    outputs: &[Output::result("CIRCLECI_USER_INFO")],
    prepare: None,
}];
