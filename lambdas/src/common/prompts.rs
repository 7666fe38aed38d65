use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};

use crate::common::attributes::{string_attribute, Item};
use crate::common::KEY_ATTRIBUTE;

/// Key of the util-table row holding the active prompt id.
pub const SELECTED_PROMPT_KEY: &str = "selected_prompt";
pub const VALUE_ATTRIBUTE: &str = "value";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDescriptor {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptConfig {
    pub selected_id: Option<String>,
    pub prompts: Vec<PromptDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectPromptRequest {
    pub selected_id: String,
}

impl PromptConfig {
    /// Builds the `/prompts` response from the prompt catalog and the
    /// util-table selection row. Catalog rows without an `ID` are skipped and
    /// ids are sorted, since scan order is arbitrary.
    pub fn from_items(catalog: impl IntoIterator<Item = Item>, selection: Option<&Item>) -> Self {
        let mut prompts: Vec<PromptDescriptor> = catalog
            .into_iter()
            .filter_map(|item| {
                string_attribute(&item, KEY_ATTRIBUTE).map(|id| PromptDescriptor { id: id.into() })
            })
            .collect();
        prompts.sort_by(|a, b| a.id.cmp(&b.id));

        let selected_id = selection
            .and_then(|item| string_attribute(item, VALUE_ATTRIBUTE))
            .map(String::from);

        Self {
            selected_id,
            prompts,
        }
    }
}

pub fn selection_item(selected_id: &str) -> Item {
    let mut item = Item::new();
    item.insert(
        KEY_ATTRIBUTE.into(),
        AttributeValue::S(SELECTED_PROMPT_KEY.into()),
    );
    item.insert(
        VALUE_ATTRIBUTE.into(),
        AttributeValue::S(selected_id.into()),
    );
    item
}
