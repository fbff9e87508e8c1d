//! Best-candidate matching between the desired and current views.
//!
//! For a desired object the matcher answers one question: which current-view
//! object is the same hardware object, if any? Already-matched handles short
//! circuit, entry-objects translate their key into current handle space for
//! a dictionary lookup, and everything else goes through candidate scoring:
//! disqualify candidates whose create-only attributes conflict, count equal
//! attributes, then break ties with the user label, the pre-match map,
//! per-type graph hints, reverse-dependency subtree sizes and, as a last
//! resort, a uniform random pick. The random pick only costs churn, never
//! correctness.

mod defaults;
mod hints;

pub use defaults::resolve_default;
pub(crate) use hints::MatchContext;

use log::{debug, info, warn};
use rand::Rng;
use sonic_sai_model::{AttrId, ObjectType, ValueKind, Vid};

use crate::attr::{multiset_equal, AttrValue};
use crate::object::{Object, ObjectStatus};
use crate::profile::SwitchProfile;
use crate::view::{ObjId, View};

/// A surviving candidate with its equal-attribute score.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    pub id: ObjId,
    pub vid: Vid,
    pub equal_attrs: usize,
}

/// Finds the best current-view counterpart for desired-view objects.
pub struct CandidateMatcher<'a> {
    current: &'a View,
    desired: &'a View,
    profile: &'a SwitchProfile,
}

impl<'a> CandidateMatcher<'a> {
    pub fn new(current: &'a View, desired: &'a View, profile: &'a SwitchProfile) -> Self {
        CandidateMatcher {
            current,
            desired,
            profile,
        }
    }

    /// Returns the current-view object to reuse for `desired_id`, or `None`
    /// when a new object must be created.
    pub fn find_best_match(&self, desired_id: ObjId) -> Option<ObjId> {
        let desired_obj = self.desired.obj(desired_id);

        if !desired_obj.is_entry() && desired_obj.status() == ObjectStatus::Matched {
            // same handle in both views, no search needed
            let vid = desired_obj.vid().expect("handle-object without handle");
            let id = self
                .current
                .find_by_vid(vid)
                .unwrap_or_else(|| panic!("matched handle {} missing from current view", vid));

            return Some(id);
        }

        if desired_obj.is_entry() {
            return self.find_for_entry(desired_obj);
        }

        if desired_obj.object_type() == ObjectType::Switch {
            return self.find_for_switch();
        }

        self.find_for_generic(desired_id)
    }

    /// Entry-objects translate their key into current handle space and do an
    /// exact dictionary lookup.
    fn find_for_entry(&self, desired_obj: &Object) -> Option<ObjId> {
        let key = desired_obj.entry_key().expect("entry object without key");

        let translated = key.map_handles(|vid| {
            let rid = self.desired.hardware_id(vid)?;
            self.current.vid_for_hardware(rid)
        })?;

        let id = self.current.find_entry(&translated)?;
        let found = self.current.obj(id);

        if found.status() != ObjectStatus::Unprocessed {
            panic!(
                "entry {} found in current view but already processed ({:?})",
                found.composite_key(),
                found.status()
            );
        }

        Some(id)
    }

    /// At most one switch object exists per view.
    fn find_for_switch(&self) -> Option<ObjId> {
        let switches = self.current.objects_of_type(ObjectType::Switch);
        debug_assert!(switches.len() <= 1);

        let id = *switches.first()?;
        let found = self.current.obj(id);

        if found.status() != ObjectStatus::Unprocessed {
            panic!(
                "switch {} already processed ({:?})",
                found.composite_key(),
                found.status()
            );
        }

        Some(id)
    }

    fn find_for_generic(&self, desired_id: ObjId) -> Option<ObjId> {
        let desired_obj = self.desired.obj(desired_id);
        let pool = self.current.unprocessed_of_type(desired_obj.object_type());

        let mut candidates: Vec<Candidate> = Vec::new();

        'pool: for id in pool {
            let current_obj = self.current.obj(id);
            let mut equal_attrs = 0;

            for desired_attr in desired_obj.attrs() {
                let attr_id = desired_attr.id();

                if attributes_equal(self.current, self.desired, current_obj, desired_obj, attr_id)
                {
                    equal_attrs += 1;
                    continue;
                }

                let meta = desired_attr.meta();
                if !meta.is_create_only() {
                    continue;
                }

                if current_obj.has_attr(attr_id) {
                    // differing create-only value can never be updated
                    continue 'pool;
                }

                if let Some(default) = resolve_default(meta, self.current, self.profile) {
                    if default != desired_attr.wire() {
                        continue 'pool;
                    }
                }
            }

            for current_attr in current_obj.attrs() {
                if desired_obj.has_attr(current_attr.id()) || !current_attr.meta().is_create_only()
                {
                    continue;
                }

                if let Some(default) =
                    resolve_default(current_attr.meta(), self.desired, self.profile)
                {
                    if default != current_attr.wire() {
                        continue 'pool;
                    }
                }
            }

            candidates.push(Candidate {
                id,
                vid: current_obj.vid().expect("handle-object without handle"),
                equal_attrs,
            });
        }

        debug!(
            "{} candidates for {}",
            candidates.len(),
            desired_obj.composite_key()
        );

        if candidates.is_empty() {
            return None;
        }

        if candidates.len() == 1 {
            return Some(candidates[0].id);
        }

        candidates.sort_by(|a, b| b.equal_attrs.cmp(&a.equal_attrs));

        if candidates[0].equal_attrs > candidates[1].equal_attrs {
            return Some(candidates[0].id);
        }

        let best = candidates[0].equal_attrs;
        let ties: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| c.equal_attrs == best)
            .collect();

        info!(
            "{} tied candidates for {}, trying heuristics",
            ties.len(),
            desired_obj.composite_key()
        );

        if let Some(id) = self.match_by_label(desired_obj, &ties) {
            return Some(id);
        }

        let ctx = MatchContext {
            current: self.current,
            desired: self.desired,
        };

        if let Some(id) = self.match_by_pre_match(desired_obj, &ties) {
            return Some(id);
        }

        if let Some(hint) = hints::hint_for(desired_obj.object_type()) {
            if let Some(id) = hint(&ctx, desired_obj, &ties) {
                return Some(id);
            }
        }

        if let Some(id) = self.match_by_subtree_size(desired_id, &ties) {
            return Some(id);
        }

        // accepted risk: a wrong pick costs extra churn, never correctness
        warn!(
            "heuristics failed for {}, selecting among {} candidates at random",
            desired_obj.composite_key(),
            ties.len()
        );

        let index = rand::thread_rng().gen_range(0..ties.len());
        Some(ties[index].id)
    }

    /// Unique user-label equality, for types that carry a label.
    fn match_by_label(&self, desired_obj: &Object, ties: &[Candidate]) -> Option<ObjId> {
        let label_attr = desired_obj.object_type().label_attr()?;
        let label = desired_obj.attr(label_attr)?.wire();

        if label.is_empty() {
            return None;
        }

        let same_label: Vec<&Candidate> = ties
            .iter()
            .filter(|c| {
                self.current
                    .obj(c.id)
                    .attr(label_attr)
                    .map(|a| a.wire() == label)
                    .unwrap_or(false)
            })
            .collect();

        if same_label.is_empty() {
            return None;
        }

        if same_label.len() > 1 {
            warn!(
                "label '{}' is not unique among candidates for {}",
                label,
                desired_obj.composite_key()
            );
        }

        Some(same_label[0].id)
    }

    /// Pre-match prediction recorded during the matching stage.
    fn match_by_pre_match(&self, desired_obj: &Object, ties: &[Candidate]) -> Option<ObjId> {
        let predicted = self.desired.pre_match(desired_obj.vid()?)?;

        ties.iter()
            .find(|c| c.vid == predicted)
            .map(|c| {
                debug!(
                    "pre-match pins {} to {}",
                    desired_obj.composite_key(),
                    predicted
                );
                c.id
            })
    }

    /// Unique reverse-dependency subtree size equality.
    fn match_by_subtree_size(&self, desired_id: ObjId, ties: &[Candidate]) -> Option<ObjId> {
        let want = subtree_size(self.desired, desired_id);

        let mut exact = None;
        let mut exact_count = 0;

        for candidate in ties {
            if subtree_size(self.current, candidate.id) == want {
                exact = Some(candidate.id);
                exact_count += 1;
            }
        }

        if exact_count == 1 {
            return exact;
        }

        None
    }
}

/// Checks whether one attribute is present and equal on both objects.
///
/// Serialized equality short-circuits; beyond that, pointer values compare by
/// nullness, unordered lists as multisets, and handle values through the
/// shared hardware id.
pub(crate) fn attributes_equal(
    current: &View,
    desired: &View,
    current_obj: &Object,
    desired_obj: &Object,
    attr_id: AttrId,
) -> bool {
    let (Some(current_attr), Some(desired_attr)) =
        (current_obj.attr(attr_id), desired_obj.attr(attr_id))
    else {
        return false;
    };

    if current_attr.meta().value_kind == ValueKind::Pointer {
        // raw pointer values are meaningless across address spaces
        return matches!(
            (current_attr.value(), desired_attr.value()),
            (
                AttrValue::Pointer { non_null: a },
                AttrValue::Pointer { non_null: b },
            ) if a == b
        );
    }

    if current_attr.wire() == desired_attr.wire() {
        return true;
    }

    match (current_attr.value(), desired_attr.value()) {
        (AttrValue::UnorderedList(a), AttrValue::UnorderedList(b)) => multiset_equal(a, b),

        (AttrValue::Handle(a), AttrValue::Handle(b)) => handles_equal(current, desired, *a, *b),

        (AttrValue::HandleList(a), AttrValue::HandleList(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(ca, da)| handles_equal(current, desired, *ca, *da))
        }

        _ => false,
    }
}

/// Two handles denote the same hardware object when both map to the same
/// hardware id, or when both are the shared handle of an object created
/// during this pass (which has no hardware id yet).
fn handles_equal(current: &View, desired: &View, current_vid: Vid, desired_vid: Vid) -> bool {
    if current_vid.is_null() || desired_vid.is_null() {
        return current_vid == desired_vid;
    }

    match (current.hardware_id(current_vid), desired.hardware_id(desired_vid)) {
        (Some(current_rid), Some(desired_rid)) => current_rid == desired_rid,
        _ => {
            current_vid == desired_vid
                && desired
                    .find_by_vid(desired_vid)
                    .map(|id| desired.obj(id).created_in_pass())
                    .unwrap_or(false)
        }
    }
}

/// Size of the recursive reverse-dependency tree hanging off an object:
/// every object holding a single-handle reference to it, transitively.
/// Recursion stops at same-type edges and at ports and the switch, which
/// reference nearly everything.
fn subtree_size(view: &View, id: ObjId) -> usize {
    let obj = view.obj(id);
    let Some(vid) = obj.vid() else {
        return 0;
    };

    let mut total = 0;

    for user_id in view.live_ids() {
        if user_id == id {
            continue;
        }

        let user = view.obj(user_id);
        let uses = user.attrs().any(|a| {
            a.meta().value_kind == ValueKind::Handle && a.handle() == Some(vid)
        });

        if !uses {
            continue;
        }

        total += 1;

        let user_type = user.object_type();
        if user_type != obj.object_type()
            && user_type != ObjectType::Port
            && user_type != ObjectType::Switch
        {
            total += subtree_size(view, user_id);
        }
    }

    total
}
