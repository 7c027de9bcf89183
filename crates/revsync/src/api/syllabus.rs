//! Course syllabus: modules, their items grouped by type, and per-type item
//! counts for the whole course.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::ApiError;

pub(crate) const MATERIALS_INCLUDES: &str = "modules,items";

pub(crate) const MATERIALS_FIELDS: &str = "onDemandCourseMaterialModules.v1(name,slug,description,\
timeCommitment,optional,learningObjectives),onDemandCourseMaterialItems.v2(name,originalName,slug,\
timeCommitment,contentSummary,isLocked,lockableByItem,lockedStatus,itemLockSummary)";

const MODULES_KEY: &str = "onDemandCourseMaterialModules.v1";
const ITEMS_KEY: &str = "onDemandCourseMaterialItems.v2";

const MILLIS_PER_MINUTE: u64 = 60_000;

/// Course content as listed on its syllabus page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Syllabus {
    pub course_id: String,
    /// Number of items per content type (`lecture`, `quiz`, ...).
    pub item_counts: BTreeMap<String, usize>,
    /// Modules in course order.
    pub modules: Vec<SyllabusModule>,
}

impl Syllabus {
    /// Total estimated effort in minutes.
    #[must_use]
    pub fn total_minutes(&self) -> u64 {
        self.modules.iter().map(|m| m.time_commitment_minutes).sum()
    }

    /// Ids of all items of type `type_name`, in course order.
    pub fn item_ids<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.modules
            .iter()
            .filter_map(move |m| m.items.get(type_name))
            .flatten()
            .map(|item| item.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusModule {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub learning_objectives: Vec<String>,
    pub time_commitment_minutes: u64,
    /// Items keyed by content type, each list in course order.
    pub items: BTreeMap<String, Vec<SyllabusItem>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusItem {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub locked: bool,
    pub time_commitment_minutes: u64,
}

// ---------- wire ----------

#[derive(Debug, Deserialize)]
pub(crate) struct MaterialsResponse {
    pub linked: Option<MaterialsLinked>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MaterialsLinked {
    #[serde(rename = "onDemandCourseMaterialModules.v1")]
    pub modules: Option<Vec<WireModule>>,
    #[serde(rename = "onDemandCourseMaterialItems.v2")]
    pub items: Option<Vec<WireItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireModule {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub time_commitment: u64,
    #[serde(default)]
    pub learning_objectives: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireItem {
    pub id: Option<String>,
    pub module_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub time_commitment: u64,
    pub content_summary: Option<WireContentSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireContentSummary {
    pub type_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ObjectivesResponse {
    #[serde(default)]
    pub elements: Vec<WireObjective>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireObjective {
    pub description: Option<String>,
}

/// Assemble the syllabus. Learning objectives are left empty; the returned
/// id lists (one per module, same order) say which ones to look up.
pub(crate) fn build_syllabus(
    course_id: &str,
    response: MaterialsResponse,
) -> Result<(Syllabus, Vec<Vec<String>>), ApiError> {
    let linked = response.linked.ok_or_else(|| ApiError::missing("linked"))?;
    let wire_modules = linked
        .modules
        .ok_or_else(|| ApiError::missing(format!("linked.{MODULES_KEY}")))?;
    let wire_items = linked
        .items
        .ok_or_else(|| ApiError::missing(format!("linked.{ITEMS_KEY}")))?;

    let mut modules = Vec::with_capacity(wire_modules.len());
    let mut objective_ids = Vec::with_capacity(wire_modules.len());
    for (i, wire) in wire_modules.into_iter().enumerate() {
        let id = wire
            .id
            .ok_or_else(|| ApiError::missing(format!("linked.{MODULES_KEY}[{i}].id")))?;
        objective_ids.push(wire.learning_objectives.unwrap_or_default());
        modules.push(SyllabusModule {
            id,
            name: wire.name,
            slug: wire.slug,
            description: wire.description,
            learning_objectives: Vec::new(),
            time_commitment_minutes: wire.time_commitment / MILLIS_PER_MINUTE,
            items: BTreeMap::new(),
        });
    }

    let mut item_counts = BTreeMap::new();
    for (i, wire) in wire_items.into_iter().enumerate() {
        let field = |name: &str| format!("linked.{ITEMS_KEY}[{i}].{name}");
        let id = wire.id.ok_or_else(|| ApiError::missing(field("id")))?;
        let type_name = wire
            .content_summary
            .and_then(|c| c.type_name)
            .ok_or_else(|| ApiError::missing(field("contentSummary.typeName")))?;
        let module_id = wire
            .module_id
            .ok_or_else(|| ApiError::missing(field("moduleId")))?;
        let module = modules
            .iter_mut()
            .find(|m| m.id == module_id)
            .ok_or_else(|| ApiError::InvalidField {
                field: field("moduleId"),
                message: format!("unknown module {module_id}"),
            })?;

        *item_counts.entry(type_name.clone()).or_insert(0) += 1;
        module.items.entry(type_name).or_default().push(SyllabusItem {
            id,
            name: wire.name,
            slug: wire.slug,
            locked: wire.is_locked,
            time_commitment_minutes: wire.time_commitment / MILLIS_PER_MINUTE,
        });
    }

    let syllabus = Syllabus {
        course_id: course_id.to_string(),
        item_counts,
        modules,
    };
    Ok((syllabus, objective_ids))
}
