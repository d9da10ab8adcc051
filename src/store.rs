// In-memory storage adapter
//
// BTreeMap tables keyed by typed ids, so iteration order is the stored id
// order the scheduler relies on. The Store is Clone: mutating API
// operations run against a cloned store and commit by replacement, which
// gives whole-operation rollback on error (see api::Engine).

use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};
use crate::models::course::{Course, Hole, TeeBox};
use crate::models::golfer::Golfer;
use crate::models::tournament::{
    Group, GroupMember, HoleResult, Tournament, TournamentEntry, TournamentEvent,
};
use crate::models::{
    CourseId, EntryId, EventId, GolferId, GroupId, HoleId, MemberId, ResultId, TeeBoxId,
    TournamentId,
};

#[derive(Debug, Clone, Default)]
pub struct Store {
    pub courses: BTreeMap<CourseId, Course>,
    pub holes: BTreeMap<HoleId, Hole>,
    pub tee_boxes: BTreeMap<TeeBoxId, TeeBox>,
    pub golfers: BTreeMap<GolferId, Golfer>,
    pub tournaments: BTreeMap<TournamentId, Tournament>,
    pub entries: BTreeMap<EntryId, TournamentEntry>,
    pub groups: BTreeMap<GroupId, Group>,
    pub members: BTreeMap<MemberId, GroupMember>,
    pub results: BTreeMap<ResultId, HoleResult>,
    pub events: BTreeMap<EventId, TournamentEvent>,
    next_id: u32,
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }

    fn bump(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    // --- inserts (ids are assigned here; pass a placeholder id) ---

    pub fn add_course(&mut self, mut c: Course) -> CourseId {
        let id = CourseId(self.bump());
        c.id = id;
        self.courses.insert(id, c);
        id
    }

    pub fn add_hole(&mut self, mut h: Hole) -> HoleId {
        let id = HoleId(self.bump());
        h.id = id;
        self.holes.insert(id, h);
        id
    }

    pub fn add_tee_box(&mut self, mut t: TeeBox) -> TeeBoxId {
        let id = TeeBoxId(self.bump());
        t.id = id;
        self.tee_boxes.insert(id, t);
        id
    }

    pub fn add_golfer(&mut self, mut g: Golfer) -> GolferId {
        let id = GolferId(self.bump());
        g.id = id;
        self.golfers.insert(id, g);
        id
    }

    pub fn add_tournament(&mut self, mut t: Tournament) -> TournamentId {
        let id = TournamentId(self.bump());
        t.id = id;
        self.tournaments.insert(id, t);
        id
    }

    pub fn add_entry(&mut self, mut e: TournamentEntry) -> EntryId {
        let id = EntryId(self.bump());
        e.id = id;
        self.entries.insert(id, e);
        id
    }

    pub fn add_group(&mut self, mut g: Group) -> GroupId {
        let id = GroupId(self.bump());
        g.id = id;
        self.groups.insert(id, g);
        id
    }

    pub fn add_member(&mut self, group: GroupId, entry: EntryId) -> MemberId {
        let id = MemberId(self.bump());
        self.members.insert(id, GroupMember { id, group, entry });
        id
    }

    pub fn add_result(&mut self, mut r: HoleResult) -> ResultId {
        let id = ResultId(self.bump());
        r.id = id;
        self.results.insert(id, r);
        id
    }

    pub fn add_event(&mut self, mut ev: TournamentEvent) -> EventId {
        let id = EventId(self.bump());
        ev.id = id;
        self.events.insert(id, ev);
        id
    }

    // --- lookups ---

    pub fn course(&self, id: CourseId) -> EngineResult<&Course> {
        self.courses
            .get(&id)
            .ok_or_else(|| EngineError::not_found(format!("course {}", id)))
    }

    pub fn course_by_name(&self, name: &str) -> Option<&Course> {
        self.courses.values().find(|c| c.name == name)
    }

    /// Holes of a course, sorted by hole number.
    pub fn holes_for_course(&self, course: CourseId) -> Vec<&Hole> {
        let mut holes: Vec<&Hole> = self.holes.values().filter(|h| h.course == course).collect();
        holes.sort_by_key(|h| h.number);
        holes
    }

    pub fn hole_by_number(&self, course: CourseId, number: u8) -> Option<&Hole> {
        self.holes
            .values()
            .find(|h| h.course == course && h.number == number)
    }

    pub fn tee_boxes_for_hole(&self, hole: HoleId) -> Vec<&TeeBox> {
        self.tee_boxes.values().filter(|t| t.hole == hole).collect()
    }

    pub fn tee_box_for_hole(&self, hole: HoleId, name: &str) -> Option<&TeeBox> {
        self.tee_boxes
            .values()
            .find(|t| t.hole == hole && t.name == name)
    }

    pub fn golfer(&self, id: GolferId) -> EngineResult<&Golfer> {
        self.golfers
            .get(&id)
            .ok_or_else(|| EngineError::not_found(format!("golfer {}", id)))
    }

    pub fn golfer_by_name(&self, name: &str) -> Option<&Golfer> {
        self.golfers.values().find(|g| g.name == name)
    }

    pub fn tournament(&self, id: TournamentId) -> EngineResult<&Tournament> {
        self.tournaments
            .get(&id)
            .ok_or_else(|| EngineError::not_found(format!("tournament {}", id)))
    }

    pub fn tournament_mut(&mut self, id: TournamentId) -> EngineResult<&mut Tournament> {
        self.tournaments
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found(format!("tournament {}", id)))
    }

    pub fn entry(&self, id: EntryId) -> EngineResult<&TournamentEntry> {
        self.entries
            .get(&id)
            .ok_or_else(|| EngineError::not_found(format!("entry {}", id)))
    }

    pub fn entry_mut(&mut self, id: EntryId) -> EngineResult<&mut TournamentEntry> {
        self.entries
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found(format!("entry {}", id)))
    }

    /// Entry ids for a tournament in stored (id) order.
    pub fn entry_ids_for(&self, tournament: TournamentId) -> Vec<EntryId> {
        self.entries
            .values()
            .filter(|e| e.tournament == tournament)
            .map(|e| e.id)
            .collect()
    }

    /// Group ids for a tournament in stored (id) order, which is the
    /// scheduler's iteration order.
    pub fn group_ids_for(&self, tournament: TournamentId) -> Vec<GroupId> {
        self.groups
            .values()
            .filter(|g| g.tournament == tournament)
            .map(|g| g.id)
            .collect()
    }

    /// Member entry ids of a group in insertion order.
    pub fn member_entry_ids(&self, group: GroupId) -> Vec<EntryId> {
        self.members
            .values()
            .filter(|m| m.group == group)
            .map(|m| m.entry)
            .collect()
    }

    pub fn group_contains_human(&self, group: GroupId) -> bool {
        self.member_entry_ids(group)
            .iter()
            .any(|eid| self.entries.get(eid).map(|e| e.is_human).unwrap_or(false))
    }

    /// Drop all groups and memberships for a tournament (reseed prelude).
    pub fn delete_groups_for(&mut self, tournament: TournamentId) {
        let group_ids: Vec<GroupId> = self.group_ids_for(tournament);
        self.members.retain(|_, m| !group_ids.contains(&m.group));
        self.groups.retain(|_, g| g.tournament != tournament);
    }

    pub fn results_for_entry(&self, entry: EntryId) -> Vec<&HoleResult> {
        self.results.values().filter(|r| r.entry == entry).collect()
    }

    pub fn result_for(&self, entry: EntryId, round: u8, hole: u8) -> Option<&HoleResult> {
        self.results
            .values()
            .find(|r| r.entry == entry && r.round_number == round && r.hole_number == hole)
    }

    pub fn result_for_mut(&mut self, entry: EntryId, round: u8, hole: u8) -> Option<&mut HoleResult> {
        self.results
            .values_mut()
            .find(|r| r.entry == entry && r.round_number == round && r.hole_number == hole)
    }

    pub fn events_for(&self, tournament: TournamentId) -> Vec<&TournamentEvent> {
        self.events
            .values()
            .filter(|e| e.tournament == tournament)
            .collect()
    }

    // --- derived totals ---

    /// Recompute an entry's round and cumulative stroke totals from its
    /// HoleResults. The results are the ground truth; the totals are cache.
    pub fn recompute_entry_totals(&mut self, entry: EntryId, round: u8) -> EngineResult<()> {
        let (round_total, tournament_total) = {
            let results = self.results_for_entry(entry);
            let round_total: i32 = results
                .iter()
                .filter(|r| r.round_number == round)
                .map(|r| r.strokes as i32)
                .sum();
            let tournament_total: i32 = results.iter().map(|r| r.strokes as i32).sum();
            (round_total, tournament_total)
        };

        let e = self.entry_mut(entry)?;
        e.total_strokes = round_total;
        e.tournament_strokes = tournament_total;
        Ok(())
    }

    /// Strokes over rounds 1-2 for the cut; None when the entry has no
    /// results in those rounds.
    pub fn r12_total(&self, entry: EntryId) -> Option<i32> {
        let results = self.results_for_entry(entry);
        let relevant: Vec<i32> = results
            .iter()
            .filter(|r| r.round_number <= 2)
            .map(|r| r.strokes as i32)
            .collect();
        if relevant.is_empty() {
            None
        } else {
            Some(relevant.iter().sum())
        }
    }
}
