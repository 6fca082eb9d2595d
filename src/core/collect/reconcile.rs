//! Assignment/module reconciliation
//!
//! Assignments reach us through two listings: the flat assignment listing and
//! the items of each module. Module items point at assignments (or quizzes)
//! by URL. Both are folded into one record per [`ContentKey`]:
//!
//! - module data owns organisation: position, publication, module linkage
//! - listing data owns content: name, points, timestamps, submission metadata
//!
//! Module-only records are built from the item itself, with content details
//! (when requested) standing in for the listing's timestamps and points.
//!
//! A quiz item only joins a listing record through that record's `quiz_id`.
//! Otherwise it stays keyed by its quiz id, which never matches an assignment.

use crate::adapters::canvas::models::{ApiModule, ApiModuleItem};
use crate::core::profile::{AssignmentFields, CollectionProfile};
use crate::domain::{
    AssignmentId, AssignmentKind, AssignmentRecord, ContentKey, CourseId, ModuleLink, ModuleRecord,
    QuizId, RecordSource,
};
use std::collections::{HashMap, HashSet};

/// Output of [`reconcile`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    /// Sorted by position
    pub modules: Vec<ModuleRecord>,
    /// Unique by key; module-linked records first, in module then item order
    pub assignments: Vec<AssignmentRecord>,
}

/// Merges the listing with module items, applies the profile's processing
/// filters and shapes the assignment fields
pub fn reconcile(
    course_id: CourseId,
    listing: Vec<AssignmentRecord>,
    mut modules: Vec<ApiModule>,
    profile: &CollectionProfile,
) -> Reconciled {
    let mut records: Vec<AssignmentRecord> = Vec::with_capacity(listing.len());
    let mut index: HashMap<ContentKey, usize> = HashMap::new();
    for record in listing {
        if index.contains_key(&record.key) {
            tracing::debug!(key = %record.key, "Duplicate assignment in listing ignored");
            continue;
        }
        index.insert(record.key, records.len());
        records.push(record);
    }

    let quiz_assignments: HashMap<QuizId, AssignmentId> = records
        .iter()
        .filter_map(|r| Some((r.quiz_id?, r.assignment_id()?)))
        .collect();

    modules.sort_by_key(|m| (m.position.unwrap_or(u32::MAX), m.id));
    let mut module_records = Vec::with_capacity(modules.len());

    for module in modules {
        let module_position = module.position.unwrap_or(0);
        let module_name = module.name.clone().unwrap_or_default();
        let mut items = module.items.unwrap_or_default();
        items.sort_by_key(|item| (item.position.unwrap_or(u32::MAX), item.id));

        let mut assignment_keys = Vec::new();
        for item in &items {
            let Some(kind) = item.kind() else {
                continue;
            };
            let Some(content) = item.content_ref() else {
                tracing::warn!(
                    module_id = %module.id,
                    module_item_id = %item.id,
                    "Module item has no resolvable content id"
                );
                continue;
            };

            let key = match kind {
                AssignmentKind::Quiz => {
                    let quiz = QuizId::new(content);
                    match quiz_assignments.get(&quiz) {
                        Some(&id) if profile.processing.resolve_quiz_assignments => {
                            ContentKey::Assignment(id)
                        }
                        _ => ContentKey::Quiz(quiz),
                    }
                }
                AssignmentKind::Assignment => ContentKey::Assignment(AssignmentId::new(content)),
            };

            let link = ModuleLink {
                module_id: module.id,
                module_name: module_name.clone(),
                module_position,
                module_item_id: item.id,
            };

            match index.get(&key) {
                Some(&i) => apply_module_placement(&mut records[i], item, link),
                None => {
                    let record = module_only_record(key, course_id, kind, item, link);
                    index.insert(key, records.len());
                    records.push(record);
                }
            }

            if !assignment_keys.contains(&key) {
                assignment_keys.push(key);
            }
        }

        module_records.push(ModuleRecord {
            id: module.id,
            course_id,
            name: module_name,
            position: module_position,
            published: module.published.unwrap_or(true),
            unlock_at: module.unlock_at,
            items_count: module.items_count.unwrap_or(items.len() as u32),
            assignment_keys,
        });
    }

    let mut reconciled = Reconciled {
        modules: module_records,
        assignments: records,
    };
    apply_filters(&mut reconciled, profile);

    reconciled.assignments.sort_by_key(|r| {
        (
            r.module.as_ref().map_or(u32::MAX, |m| m.module_position),
            r.position,
            r.key,
        )
    });
    for record in &mut reconciled.assignments {
        shape_assignment(record, &profile.assignment_fields);
    }

    reconciled
}

/// First placement wins when an assignment appears in several modules
fn apply_module_placement(record: &mut AssignmentRecord, item: &ApiModuleItem, link: ModuleLink) {
    if record.module.is_some() {
        return;
    }

    record.position = item.position.unwrap_or(record.position);
    record.published = item.published.unwrap_or(record.published);
    record.module = Some(link);
    if record.source == RecordSource::Listing {
        record.source = RecordSource::Merged;
    }

    if let Some(details) = &item.content_details {
        record.due_at = record.due_at.or(details.due_at);
        record.unlock_at = record.unlock_at.or(details.unlock_at);
        record.lock_at = record.lock_at.or(details.lock_at);
    }
}

fn module_only_record(
    key: ContentKey,
    course_id: CourseId,
    kind: AssignmentKind,
    item: &ApiModuleItem,
    link: ModuleLink,
) -> AssignmentRecord {
    let details = item.content_details.clone().unwrap_or_default();

    let mut record = AssignmentRecord::new(key, course_id, kind);
    record.source = RecordSource::Module;
    record.position = item.position.unwrap_or(0);
    record.published = item.published.unwrap_or(true);
    record.name = Some(item.title.clone().unwrap_or_default());
    record.points_possible = Some(details.points_possible.unwrap_or(0.0));
    record.due_at = details.due_at;
    record.unlock_at = details.unlock_at;
    record.lock_at = details.lock_at;
    record.html_url = item.html_url.clone();
    record.module = Some(link);
    record
}

fn apply_filters(reconciled: &mut Reconciled, profile: &CollectionProfile) {
    let processing = &profile.processing;
    let before = reconciled.assignments.len();

    if !processing.include_unpublished {
        reconciled.modules.retain(|m| m.published);
        reconciled.assignments.retain(|a| a.published);
    }

    // Without the listing there is nothing to tell graded quizzes apart
    if processing.filter_ungraded_quizzes && profile.collects_assignments() {
        reconciled.assignments.retain(|a| !a.is_quiz() || is_graded(a));
    }

    let kept: HashSet<ContentKey> = reconciled.assignments.iter().map(|a| a.key).collect();
    for module in &mut reconciled.modules {
        module.assignment_keys.retain(|key| kept.contains(key));
    }

    let dropped = before - reconciled.assignments.len();
    if dropped > 0 {
        tracing::debug!(
            dropped,
            kept = reconciled.assignments.len(),
            "Assignments removed by processing filters"
        );
    }
}

fn is_graded(record: &AssignmentRecord) -> bool {
    record.is_backed_by_listing() && record.grading_type.as_deref() != Some("not_graded")
}

/// Blanks the sections the profile does not ask for
pub fn shape_assignment(record: &mut AssignmentRecord, fields: &AssignmentFields) {
    if !fields.basic_info {
        record.name = None;
        record.points_possible = None;
    }
    if !fields.timestamps {
        record.due_at = None;
        record.unlock_at = None;
        record.lock_at = None;
        record.created_at = None;
        record.updated_at = None;
    }
    if !fields.submission_info {
        record.submission_types = None;
        record.grading_type = None;
        record.has_submitted_submissions = None;
    }
    if !fields.urls {
        record.html_url = None;
    }
    if !fields.module_linkage {
        record.module = None;
    }
}
