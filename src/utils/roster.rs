//! In-memory view of one day's staffing used to enforce the
//! one-placement-per-person rule before any row is written.
//!
//! A person is either unplaced, crew in exactly one department shift, or
//! lead of exactly one department shift for a given date. Handlers load the
//! whole day, ask this module what a mutation is allowed to do, and then
//! execute the resulting plan inside a single transaction.

/// One department shift, reduced to what the invariant cares about.
#[derive(Debug, Clone)]
pub struct RosterShift {
    pub id: i32,
    pub department: String,
    pub location_id: Option<i32>,
    pub crew: Vec<i32>,
    pub lead_id: Option<i32>,
}

/// Where a person currently sits on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Crew { shift_id: i32 },
    Lead { shift_id: i32 },
}

#[derive(Debug, PartialEq, Eq)]
pub enum RosterViolation {
    UnknownShift(i32),
    /// Person already sits somewhere on this date; moves must be explicit.
    AlreadyPlaced {
        person_id: i32,
        shift_id: i32,
        as_lead: bool,
    },
    NotCrewMember {
        person_id: i32,
        shift_id: i32,
    },
    SameShift(i32),
}

/// Outcome of a crew-assignment check.
#[derive(Debug, PartialEq, Eq)]
pub enum AssignOutcome {
    Add,
    /// Already crew of this very shift; the operation is an idempotent no-op.
    AlreadyCrewHere,
}

/// The row updates `setLead` must commit as one unit.
#[derive(Debug, PartialEq, Eq)]
pub struct LeadPlan {
    pub shift_id: i32,
    pub person_id: i32,
    /// Shifts whose crew array must drop the person.
    pub strip_crew: Vec<i32>,
    /// Shifts (other than the target) whose lead slot must be cleared.
    pub clear_lead: Vec<i32>,
    /// The target shift's previous lead, displaced back to the pool.
    pub displaced_lead: Option<i32>,
    /// The person already holds this lead slot.
    pub already_lead: bool,
}

impl LeadPlan {
    /// True when re-applying the plan changes nothing.
    pub fn is_noop(&self) -> bool {
        self.already_lead && self.strip_crew.is_empty() && self.clear_lead.is_empty()
    }
}

/// Every shift on the board for one calendar date, across all locations.
/// The exclusivity rule is global per date, so scope filtering happens
/// before display, never before an invariant check.
#[derive(Debug, Default)]
pub struct DayRoster {
    pub shifts: Vec<RosterShift>,
}

impl DayRoster {
    pub fn new(shifts: Vec<RosterShift>) -> Self {
        Self { shifts }
    }

    pub fn shift(&self, shift_id: i32) -> Option<&RosterShift> {
        self.shifts.iter().find(|s| s.id == shift_id)
    }

    pub fn placement_of(&self, person_id: i32) -> Option<Placement> {
        for s in &self.shifts {
            if s.lead_id == Some(person_id) {
                return Some(Placement::Lead { shift_id: s.id });
            }
            if s.crew.contains(&person_id) {
                return Some(Placement::Crew { shift_id: s.id });
            }
        }
        None
    }

    /// True when a department row with this key already exists on the date.
    pub fn has_department(&self, name: &str, location_id: Option<i32>) -> bool {
        self.shifts
            .iter()
            .any(|s| s.department == name && s.location_id == location_id)
    }

    /// Set difference: active personnel minus everyone placed anywhere today.
    /// Preserves the order of `active` so callers control the sort.
    pub fn unassigned(&self, active: &[i32]) -> Vec<i32> {
        active
            .iter()
            .copied()
            .filter(|p| self.placement_of(*p).is_none())
            .collect()
    }

    /// Validate adding `person_id` to the crew of `shift_id`.
    pub fn check_assign(
        &self,
        shift_id: i32,
        person_id: i32,
    ) -> Result<AssignOutcome, RosterViolation> {
        if self.shift(shift_id).is_none() {
            return Err(RosterViolation::UnknownShift(shift_id));
        }
        match self.placement_of(person_id) {
            Some(Placement::Crew { shift_id: here }) if here == shift_id => {
                Ok(AssignOutcome::AlreadyCrewHere)
            }
            Some(Placement::Crew { shift_id: other }) => Err(RosterViolation::AlreadyPlaced {
                person_id,
                shift_id: other,
                as_lead: false,
            }),
            Some(Placement::Lead { shift_id: other }) => Err(RosterViolation::AlreadyPlaced {
                person_id,
                shift_id: other,
                as_lead: true,
            }),
            None => Ok(AssignOutcome::Add),
        }
    }

    /// Compute the single-transaction plan that makes `person_id` the lead
    /// of `shift_id`: strip any crew membership for the day, clear any prior
    /// lead slot, and displace the target shift's current lead.
    pub fn plan_set_lead(&self, shift_id: i32, person_id: i32) -> Result<LeadPlan, RosterViolation> {
        let target = self
            .shift(shift_id)
            .ok_or(RosterViolation::UnknownShift(shift_id))?;

        let strip_crew: Vec<i32> = self
            .shifts
            .iter()
            .filter(|s| s.crew.contains(&person_id))
            .map(|s| s.id)
            .collect();

        let clear_lead: Vec<i32> = self
            .shifts
            .iter()
            .filter(|s| s.id != shift_id && s.lead_id == Some(person_id))
            .map(|s| s.id)
            .collect();

        let displaced_lead = match target.lead_id {
            Some(prior) if prior != person_id => Some(prior),
            _ => None,
        };

        Ok(LeadPlan {
            shift_id,
            person_id,
            strip_crew,
            clear_lead,
            displaced_lead,
            already_lead: target.lead_id == Some(person_id),
        })
    }

    /// Validate moving a crew member between two shifts on the same date.
    pub fn check_transfer(
        &self,
        person_id: i32,
        from_shift_id: i32,
        to_shift_id: i32,
    ) -> Result<(), RosterViolation> {
        if from_shift_id == to_shift_id {
            return Err(RosterViolation::SameShift(from_shift_id));
        }
        let from = self
            .shift(from_shift_id)
            .ok_or(RosterViolation::UnknownShift(from_shift_id))?;
        if self.shift(to_shift_id).is_none() {
            return Err(RosterViolation::UnknownShift(to_shift_id));
        }
        if !from.crew.contains(&person_id) {
            return Err(RosterViolation::NotCrewMember {
                person_id,
                shift_id: from_shift_id,
            });
        }
        Ok(())
    }

    /// Mutate the in-memory roster the way the committed transaction would.
    pub fn apply_lead_plan(&mut self, plan: &LeadPlan) {
        for s in &mut self.shifts {
            if plan.strip_crew.contains(&s.id) {
                s.crew.retain(|p| *p != plan.person_id);
            }
            if plan.clear_lead.contains(&s.id) {
                s.lead_id = None;
            }
            if s.id == plan.shift_id {
                s.lead_id = Some(plan.person_id);
            }
        }
    }

    /// People referenced by `incoming` rows (crew or lead) who already sit
    /// somewhere on this date. An additive copy that would land any of them
    /// twice must be rejected, not merged.
    pub fn occupied_people(&self, incoming: &[RosterShift]) -> Vec<i32> {
        let mut hits: Vec<i32> = incoming
            .iter()
            .flat_map(|s| s.crew.iter().copied().chain(s.lead_id))
            .filter(|p| self.placement_of(*p).is_some())
            .collect();
        hits.sort_unstable();
        hits.dedup();
        hits
    }

    /// Debug/test assertion: no person appears in two places.
    pub fn holds_exclusivity(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        for s in &self.shifts {
            for p in s.crew.iter().chain(s.lead_id.iter()) {
                if !seen.insert(*p) {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift(id: i32, department: &str, crew: &[i32], lead_id: Option<i32>) -> RosterShift {
        RosterShift {
            id,
            department: department.to_string(),
            location_id: None,
            crew: crew.to_vec(),
            lead_id,
        }
    }

    // Date 2024-06-03: "Shipping" has P1 as crew and P2 as lead. Promoting
    // P1 must strip P1 from crew, displace P2 to the pool, and leave the
    // board consistent.
    #[test]
    fn promoting_a_crew_member_displaces_the_prior_lead() {
        let mut roster = DayRoster::new(vec![shift(1, "Shipping", &[101], Some(102))]);

        let plan = roster.plan_set_lead(1, 101).unwrap();
        assert_eq!(plan.strip_crew, vec![1]);
        assert_eq!(plan.clear_lead, Vec::<i32>::new());
        assert_eq!(plan.displaced_lead, Some(102));

        roster.apply_lead_plan(&plan);
        let s = roster.shift(1).unwrap();
        assert_eq!(s.lead_id, Some(101));
        assert!(s.crew.is_empty());
        assert!(roster.holds_exclusivity());

        // P2 fell back to the unassigned pool, not into any crew.
        assert_eq!(roster.unassigned(&[101, 102, 103]), vec![102, 103]);
    }

    #[test]
    fn set_lead_is_idempotent() {
        let mut roster = DayRoster::new(vec![
            shift(1, "Shipping", &[101, 103], Some(102)),
            shift(2, "Receiving", &[104], None),
        ]);

        let first = roster.plan_set_lead(1, 101).unwrap();
        roster.apply_lead_plan(&first);
        let snapshot: Vec<_> = roster
            .shifts
            .iter()
            .map(|s| (s.id, s.crew.clone(), s.lead_id))
            .collect();

        let second = roster.plan_set_lead(1, 101).unwrap();
        assert!(second.is_noop());
        roster.apply_lead_plan(&second);
        let after: Vec<_> = roster
            .shifts
            .iter()
            .map(|s| (s.id, s.crew.clone(), s.lead_id))
            .collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    fn set_lead_clears_a_lead_slot_held_elsewhere() {
        let mut roster = DayRoster::new(vec![
            shift(1, "Shipping", &[], Some(105)),
            shift(2, "Receiving", &[], None),
        ]);

        let plan = roster.plan_set_lead(2, 105).unwrap();
        assert_eq!(plan.clear_lead, vec![1]);
        roster.apply_lead_plan(&plan);
        assert_eq!(roster.shift(1).unwrap().lead_id, None);
        assert_eq!(roster.shift(2).unwrap().lead_id, Some(105));
        assert!(roster.holds_exclusivity());
    }

    // Scenario D: P is crew in "Shipping"; assigning P to "Receiving"
    // without unassigning first must fail. Transfers are explicit.
    #[test]
    fn assign_rejects_a_person_already_placed_elsewhere() {
        let roster = DayRoster::new(vec![
            shift(1, "Shipping", &[101], None),
            shift(2, "Receiving", &[], None),
        ]);

        let err = roster.check_assign(2, 101).unwrap_err();
        assert_eq!(
            err,
            RosterViolation::AlreadyPlaced {
                person_id: 101,
                shift_id: 1,
                as_lead: false
            }
        );
    }

    #[test]
    fn assign_rejects_a_lead_from_another_department() {
        let roster = DayRoster::new(vec![
            shift(1, "Shipping", &[], Some(101)),
            shift(2, "Receiving", &[], None),
        ]);

        let err = roster.check_assign(2, 101).unwrap_err();
        assert_eq!(
            err,
            RosterViolation::AlreadyPlaced {
                person_id: 101,
                shift_id: 1,
                as_lead: true
            }
        );
    }

    #[test]
    fn assign_to_the_same_shift_is_a_noop() {
        let roster = DayRoster::new(vec![shift(1, "Shipping", &[101], None)]);
        assert_eq!(
            roster.check_assign(1, 101).unwrap(),
            AssignOutcome::AlreadyCrewHere
        );
        assert_eq!(roster.check_assign(1, 102).unwrap(), AssignOutcome::Add);
    }

    #[test]
    fn unassigned_pool_is_the_set_difference() {
        let roster = DayRoster::new(vec![
            shift(1, "Shipping", &[101, 102], Some(103)),
            shift(2, "Receiving", &[104], None),
        ]);

        // 106 is terminated upstream and simply not in the active list.
        let active = [101, 102, 103, 104, 105, 107];
        assert_eq!(roster.unassigned(&active), vec![105, 107]);
    }

    #[test]
    fn transfer_requires_membership_and_distinct_shifts() {
        let roster = DayRoster::new(vec![
            shift(1, "Shipping", &[101], None),
            shift(2, "Receiving", &[], None),
        ]);

        assert!(roster.check_transfer(101, 1, 2).is_ok());
        assert_eq!(
            roster.check_transfer(102, 1, 2).unwrap_err(),
            RosterViolation::NotCrewMember {
                person_id: 102,
                shift_id: 1
            }
        );
        assert_eq!(
            roster.check_transfer(101, 1, 1).unwrap_err(),
            RosterViolation::SameShift(1)
        );
        assert_eq!(
            roster.check_transfer(101, 1, 9).unwrap_err(),
            RosterViolation::UnknownShift(9)
        );
    }

    // Copying a day onto a non-empty target must not double-place anyone:
    // the department names may be disjoint while the people overlap.
    #[test]
    fn copy_onto_a_staffed_day_flags_people_already_placed() {
        let target = DayRoster::new(vec![shift(1, "Other", &[101], Some(102))]);
        let incoming = vec![
            shift(90, "Shipping", &[101, 103], None),
            shift(91, "Receiving", &[], Some(102)),
        ];

        // No department-name collision, yet two people would land twice.
        assert!(!target.has_department("Shipping", None));
        assert!(!target.has_department("Receiving", None));
        assert_eq!(target.occupied_people(&incoming), vec![101, 102]);

        // A merged board built from that copy would break exclusivity.
        let mut merged = DayRoster::new(target.shifts.clone());
        merged.shifts.extend(incoming.iter().cloned());
        assert!(!merged.holds_exclusivity());

        // With the overlapping people gone the copy is clean.
        let clean = vec![shift(92, "Shipping", &[103, 104], None)];
        assert!(target.occupied_people(&clean).is_empty());
    }

    #[test]
    fn department_keys_include_location() {
        let roster = DayRoster::new(vec![
            RosterShift {
                id: 1,
                department: "Shipping".to_string(),
                location_id: Some(7),
                crew: vec![],
                lead_id: None,
            },
        ]);
        assert!(roster.has_department("Shipping", Some(7)));
        assert!(!roster.has_department("Shipping", None));
        assert!(!roster.has_department("Receiving", Some(7)));
    }
}
