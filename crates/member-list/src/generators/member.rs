//! Member generation with dues status, union affiliation, and derived dates.
//!
//! Fields are produced by an ordered pipeline: independent samples first,
//! then each derived field from the fields it depends on. The derivation
//! stages are free functions so each can be checked on its own.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use fake::Fake;
use fake::faker::address::en::CityName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::{CellNumber, PhoneNumber};
use rand::Rng;
use time::macros::date;
use time::{Date, Duration, Month, OffsetDateTime};

use super::sampling::{Categorical, TableError, chance, pick_uniform};
use crate::models::{
    MailingPreference, MemberRecord, MembershipStatus, MembershipType, MonthlyDuesStatus, Race,
    StudentStatus, UnionMember, YearlyDuesStatus,
};

/// Earliest join date on the national list.
pub const EARLIEST_JOIN_DATE: Date = date!(1982 - 06 - 01);

/// Expiration date given to lifetime members.
pub const LIFETIME_XDATE: Date = date!(2099 - 11 - 01);

pub const LIFETIME_PROBABILITY: f64 = 0.01;

pub const ACTIONKIT_ID_RANGE: RangeInclusive<u32> = 1000..=999_999;

/// Number of distinct ActionKit ids a single run can issue.
pub const ACTIONKIT_ID_CAPACITY: usize =
    (*ACTIONKIT_ID_RANGE.end() - *ACTIONKIT_ID_RANGE.start() + 1) as usize;

const UNION_LOCAL_RANGE: RangeInclusive<u16> = 5..=5999;

const UNION_NAMES: [&str; 11] = [
    "", "NEA", "SEIU", "AFSCME", "Teamsters", "UFCW", "UAW", "USW", "AFT", "IBEW", "LIUNA",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MiddleNameStyle {
    Initial,
    Full,
    Omitted,
}

/// Configuration for member generation.
#[derive(Debug, Clone)]
pub struct MemberGenConfig {
    /// Chapter written to every record.
    pub dsa_chapter: String,
    /// Youth chapter written to every record.
    pub ydsa_chapter: String,
    /// Districts sampled uniformly.
    pub congressional_districts: Vec<String>,
    pub do_not_call_rate: f64,
    pub p2ptext_optout_rate: f64,
    pub mobile_phone_rate: f64,
    pub home_phone_rate: f64,
    pub work_phone_rate: f64,
}

impl Default for MemberGenConfig {
    fn default() -> Self {
        Self {
            dsa_chapter: "Heaven".to_string(),
            ydsa_chapter: String::new(),
            congressional_districts: vec!["ME_01".to_string(), "ME_02".to_string()],
            do_not_call_rate: 0.08,
            p2ptext_optout_rate: 0.16,
            mobile_phone_rate: 0.7,
            home_phone_rate: 0.5,
            work_phone_rate: 0.1,
        }
    }
}

/// Weight tables, validated once when the generator is built.
#[derive(Debug, Clone)]
struct MemberTables {
    middle_name: Categorical<MiddleNameStyle>,
    membership_type: Categorical<MembershipType>,
    union_member: Categorical<UnionMember>,
    union_name: Categorical<&'static str>,
    race: Categorical<Race>,
    student: Categorical<StudentStatus>,
    mailing_pref: Categorical<MailingPreference>,
    district: Categorical<String>,
}

impl MemberTables {
    fn build(config: &MemberGenConfig) -> Result<Self, TableError> {
        use MembershipType as T;
        use UnionMember as U;

        let mut union_names = vec![(UNION_NAMES[0], 0.1)];
        union_names.extend(UNION_NAMES[1..].iter().map(|name| (*name, 0.09)));

        Ok(Self {
            middle_name: Categorical::new(&[
                (MiddleNameStyle::Initial, 0.08),
                (MiddleNameStyle::Full, 0.06),
                (MiddleNameStyle::Omitted, 0.86),
            ])?,
            membership_type: Categorical::new(&[
                (T::Unspecified, 0.01),
                (T::OneTime, 0.2),
                (T::Yearly, 0.2),
                (T::Annual, 0.2),
                (T::Monthly, 0.2),
                (T::IncomeBased, 0.19),
            ])?,
            union_member: Categorical::new(&[
                (U::Unspecified, 0.05),
                (U::Current, 0.19),
                (U::Retired, 0.19),
                (U::Former, 0.19),
                (U::NotMember, 0.19),
                (U::Organizing, 0.19),
            ])?,
            union_name: Categorical::new(&union_names)?,
            race: Categorical::uniform(Race::ALL)?,
            student: Categorical::uniform(StudentStatus::ALL)?,
            mailing_pref: Categorical::uniform(MailingPreference::ALL)?,
            district: Categorical::uniform(&config.congressional_districts)?,
        })
    }
}

/// Generates synthetic member records.
///
/// ActionKit ids are unique across every record produced by one generator.
pub struct MemberGenerator {
    config: MemberGenConfig,
    tables: MemberTables,
    issued_ids: HashSet<u32>,
}

impl MemberGenerator {
    /// Creates a new member generator with default configuration.
    pub fn new() -> Self {
        Self::with_config(MemberGenConfig::default())
            .expect("built-in member weight tables are normalized")
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: MemberGenConfig) -> Result<Self, TableError> {
        let tables = MemberTables::build(&config)?;
        Ok(Self {
            config,
            tables,
            issued_ids: HashSet::new(),
        })
    }

    /// Generates a single member dated against today's (UTC) date.
    pub fn generate(&mut self, rng: &mut impl Rng) -> MemberRecord {
        let today = OffsetDateTime::now_utc().date();
        self.generate_on(today, rng)
    }

    /// Generates a single member with every date computed against `today`.
    pub fn generate_on(&mut self, today: Date, rng: &mut impl Rng) -> MemberRecord {
        // Independent samples.
        let first_name: String = FirstName().fake_with_rng(rng);
        let middle_name = self.generate_middle_name(rng);
        let last_name: String = LastName().fake_with_rng(rng);
        // Reserved example.* domains only.
        let email: String = SafeEmail().fake_with_rng(rng);
        let do_not_call = chance(self.config.do_not_call_rate, rng);
        let p2ptext_optout = chance(self.config.p2ptext_optout_rate, rng);
        let mobile_phone = maybe_phone(self.config.mobile_phone_rate, rng, |rng| {
            CellNumber().fake_with_rng(rng)
        });
        let home_phone = maybe_phone(self.config.home_phone_rate, rng, |rng| {
            PhoneNumber().fake_with_rng(rng)
        });
        let work_phone = maybe_phone(self.config.work_phone_rate, rng, |rng| {
            PhoneNumber().fake_with_rng(rng)
        });
        let membership_type = self.tables.membership_type.sample(rng);
        let union_member = self.tables.union_member.sample(rng);
        let race = self.tables.race.sample(rng);
        let student_yes_no = self.tables.student.sample(rng);
        let mailing_pref = self.tables.mailing_pref.sample(rng);
        let congressional_district = self.tables.district.sample(rng);
        let actionkit_id = self.next_actionkit_id(rng);

        // Derived fields, in dependency order.
        let best_phone = best_phone(&mobile_phone, &home_phone, &work_phone);
        let join_date = join_date(today, rng);
        let xdate = expiration_date(join_date, today, rng);
        let membership_status = membership_status(xdate, today);
        let monthly_dues_status = pick_uniform(
            &monthly_dues_support(membership_status),
            MonthlyDuesStatus::Lapsed,
            rng,
        );
        let yearly_dues_status = pick_uniform(
            &yearly_dues_support(membership_status, monthly_dues_status),
            YearlyDuesStatus::Unspecified,
            rng,
        );
        let (union_name, union_local) =
            union_affiliation(union_member, &self.tables.union_name, rng);
        let student_school_name = school_name(student_yes_no, rng);

        MemberRecord {
            first_name,
            middle_name,
            last_name,
            email,
            do_not_call,
            p2ptext_optout,
            mobile_phone,
            home_phone,
            work_phone,
            best_phone,
            join_date,
            xdate,
            membership_status,
            memb_status_letter: membership_status.letter(),
            membership_type,
            monthly_dues_status,
            yearly_dues_status,
            union_member,
            union_name,
            union_local,
            accomodations: String::new(),
            race,
            student_yes_no,
            student_school_name,
            mailing_pref,
            actionkit_id,
            dsa_chapter: self.config.dsa_chapter.clone(),
            ydsa_chapter: self.config.ydsa_chapter.clone(),
            congressional_district,
        }
    }

    fn generate_middle_name(&self, rng: &mut impl Rng) -> String {
        match self.tables.middle_name.sample(rng) {
            MiddleNameStyle::Initial => {
                let name: String = FirstName().fake_with_rng(rng);
                name.chars()
                    .next()
                    .map(|initial| format!("{initial}."))
                    .unwrap_or_default()
            }
            MiddleNameStyle::Full => FirstName().fake_with_rng(rng),
            MiddleNameStyle::Omitted => String::new(),
        }
    }

    /// Draws an id not yet issued by this generator.
    fn next_actionkit_id(&mut self, rng: &mut impl Rng) -> u32 {
        if self.issued_ids.len() >= ACTIONKIT_ID_CAPACITY {
            tracing::warn!("ActionKit id range exhausted; ids will repeat");
            return rng.gen_range(ACTIONKIT_ID_RANGE);
        }

        loop {
            let id = rng.gen_range(ACTIONKIT_ID_RANGE);
            if self.issued_ids.insert(id) {
                return id;
            }
        }
    }
}

impl Default for MemberGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// First non-empty phone, in mobile > home > work priority.
pub fn best_phone(mobile: &str, home: &str, work: &str) -> String {
    [mobile, home, work]
        .into_iter()
        .find(|phone| !phone.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Uniform join date between [`EARLIEST_JOIN_DATE`] and `today`.
pub fn join_date(today: Date, rng: &mut impl Rng) -> Date {
    random_date_between(EARLIEST_JOIN_DATE, today, rng)
}

/// Expiration date: the lifetime sentinel, or at least a year after joining
/// and at most a year from today.
pub fn expiration_date(join_date: Date, today: Date, rng: &mut impl Rng) -> Date {
    if chance(LIFETIME_PROBABILITY, rng) {
        return LIFETIME_XDATE;
    }
    random_date_between(add_years(join_date, 1), add_years(today, 1), rng)
}

pub fn membership_status(xdate: Date, today: Date) -> MembershipStatus {
    if xdate >= today {
        MembershipStatus::GoodStanding
    } else if xdate > add_years(today, -1) {
        MembershipStatus::Member
    } else {
        MembershipStatus::Lapsed
    }
}

/// Monthly dues statuses a member with `status` may have.
pub fn monthly_dues_support(status: MembershipStatus) -> Vec<MonthlyDuesStatus> {
    use MonthlyDuesStatus as M;

    let mut support = vec![
        M::Lapsed,
        M::PastDue,
        M::CanceledByProcessor,
        M::CanceledByAdmin,
        M::CanceledByFailure,
    ];
    if status.is_good_standing() {
        support.push(M::Active);
    }
    support
}

/// Yearly dues statuses; only one billing cycle may be active.
pub fn yearly_dues_support(
    status: MembershipStatus,
    monthly: MonthlyDuesStatus,
) -> Vec<YearlyDuesStatus> {
    use YearlyDuesStatus as Y;

    let mut support = vec![
        Y::Unspecified,
        Y::Never,
        Y::CanceledByUser,
        Y::CanceledByProcessor,
        Y::CanceledByAdmin,
        Y::CanceledByFailure,
    ];
    if status.is_good_standing() && monthly != MonthlyDuesStatus::Active {
        support.push(Y::Active);
    }
    support
}

fn union_affiliation(
    union_member: UnionMember,
    names: &Categorical<&'static str>,
    rng: &mut impl Rng,
) -> (String, Option<u16>) {
    if !union_member.is_member() {
        return (String::new(), None);
    }
    (
        names.sample(rng).to_string(),
        Some(rng.gen_range(UNION_LOCAL_RANGE)),
    )
}

/// School name matching the kind of student, empty for non-students.
pub fn school_name(status: StudentStatus, rng: &mut impl Rng) -> String {
    let kinds: &[&str] = match status {
        StudentStatus::HighSchool => &["High School", "Senior High School", "Academy"],
        StudentStatus::Graduate => &["University", "Graduate School", "Institute of Technology"],
        StudentStatus::College => &["College", "Community College", "State University"],
        StudentStatus::Unspecified | StudentStatus::No => return String::new(),
    };
    let place: String = CityName().fake_with_rng(rng);
    format!("{place} {}", pick_uniform(kinds, "College", rng))
}

fn maybe_phone<R: Rng>(rate: f64, rng: &mut R, make: impl FnOnce(&mut R) -> String) -> String {
    if chance(rate, rng) {
        make(rng)
    } else {
        String::new()
    }
}

/// Uniform date in `[start, end]`; `start` when the range is empty.
pub fn random_date_between(start: Date, end: Date, rng: &mut impl Rng) -> Date {
    let span = (end - start).whole_days();
    if span <= 0 {
        return start;
    }
    start + Duration::days(rng.gen_range(0..=span))
}

/// Calendar-year shift; Feb 29 lands on Feb 28 in non-leap years.
pub fn add_years(date: Date, years: i32) -> Date {
    let year = date.year() + years;
    date.replace_year(year)
        .or_else(|_| Date::from_calendar_date(year, Month::February, 28))
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TODAY: Date = date!(2024 - 03 - 15);

    fn sample(count: usize, seed: u64) -> Vec<MemberRecord> {
        let mut member_gen = MemberGenerator::new();
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| member_gen.generate_on(TODAY, &mut rng))
            .collect()
    }

    #[test]
    fn test_generate_member() {
        let mut member_gen = MemberGenerator::new();
        let mut rng = rand::thread_rng();
        let member = member_gen.generate(&mut rng);

        assert!(!member.first_name.is_empty());
        assert!(!member.last_name.is_empty());
        assert!(member.email.contains('@'));
        assert!(ACTIONKIT_ID_RANGE.contains(&member.actionkit_id));
        assert_eq!(member.dsa_chapter, "Heaven");
    }

    #[test]
    fn test_emails_use_reserved_domains() {
        for member in sample(50, 21) {
            let (local, domain) = member.email.split_once('@').unwrap();
            assert!(!local.is_empty());
            assert!(
                ["example.com", "example.org", "example.net"].contains(&domain),
                "unexpected domain {domain}"
            );
        }
    }

    #[test]
    fn test_expiration_window() {
        for member in sample(2000, 11) {
            assert!(member.join_date >= EARLIEST_JOIN_DATE);
            assert!(member.join_date <= TODAY);
            if member.xdate != LIFETIME_XDATE {
                assert!(member.xdate >= add_years(member.join_date, 1));
                assert!(member.xdate <= add_years(TODAY, 1));
            }
        }
    }

    #[test]
    fn test_status_follows_xdate() {
        for member in sample(2000, 12) {
            assert_eq!(
                member.membership_status == MembershipStatus::GoodStanding,
                member.xdate >= TODAY
            );
            assert_eq!(member.memb_status_letter, member.membership_status.letter());
        }
    }

    #[test]
    fn test_active_dues_require_good_standing() {
        for member in sample(3000, 13) {
            let monthly_active = member.monthly_dues_status == MonthlyDuesStatus::Active;
            let yearly_active = member.yearly_dues_status == YearlyDuesStatus::Active;

            if !member.membership_status.is_good_standing() {
                assert!(!monthly_active);
                assert!(!yearly_active);
            }
            assert!(!(monthly_active && yearly_active));
        }
    }

    #[test]
    fn test_union_fields_gated() {
        for member in sample(2000, 14) {
            if member.union_member.is_member() {
                let local = member.union_local.expect("union members have a local");
                assert!(UNION_LOCAL_RANGE.contains(&local));
                assert!(UNION_NAMES.contains(&member.union_name.as_str()));
            } else {
                assert!(member.union_name.is_empty());
                assert!(member.union_local.is_none());
            }
        }
    }

    #[test]
    fn test_school_name_gated() {
        for member in sample(1000, 15) {
            assert_eq!(
                member.student_school_name.is_empty(),
                !member.student_yes_no.is_student()
            );
        }
    }

    #[test]
    fn test_best_phone_priority() {
        assert_eq!(best_phone("111", "222", "333"), "111");
        assert_eq!(best_phone("", "222", "333"), "222");
        assert_eq!(best_phone("", "", "333"), "333");
        assert_eq!(best_phone("", "", ""), "");

        for member in sample(500, 16) {
            let expected = [&member.mobile_phone, &member.home_phone, &member.work_phone]
                .into_iter()
                .find(|p| !p.is_empty())
                .cloned()
                .unwrap_or_default();
            assert_eq!(member.best_phone, expected);
        }
    }

    #[test]
    fn test_middle_name_shapes() {
        for member in sample(1000, 17) {
            let middle = &member.middle_name;
            let is_initial = middle.len() == 2 && middle.ends_with('.');
            assert!(middle.is_empty() || is_initial || !middle.contains('.'));
        }
    }

    #[test]
    fn test_actionkit_ids_unique() {
        let members = sample(5000, 18);
        let ids: HashSet<_> = members.iter().map(|m| m.actionkit_id).collect();
        assert_eq!(ids.len(), 5000);
    }

    #[test]
    fn test_membership_status_boundaries() {
        assert_eq!(membership_status(TODAY, TODAY), MembershipStatus::GoodStanding);
        assert_eq!(
            membership_status(TODAY - Duration::days(1), TODAY),
            MembershipStatus::Member
        );
        assert_eq!(
            membership_status(add_years(TODAY, -1) + Duration::days(1), TODAY),
            MembershipStatus::Member
        );
        assert_eq!(
            membership_status(add_years(TODAY, -1), TODAY),
            MembershipStatus::Lapsed
        );
        assert_eq!(
            membership_status(LIFETIME_XDATE, TODAY),
            MembershipStatus::GoodStanding
        );
    }

    #[test]
    fn test_dues_support_sets() {
        use MembershipStatus as S;

        assert!(monthly_dues_support(S::GoodStanding).contains(&MonthlyDuesStatus::Active));
        assert!(!monthly_dues_support(S::Member).contains(&MonthlyDuesStatus::Active));
        assert!(!monthly_dues_support(S::Lapsed).contains(&MonthlyDuesStatus::Active));

        assert!(
            yearly_dues_support(S::GoodStanding, MonthlyDuesStatus::PastDue)
                .contains(&YearlyDuesStatus::Active)
        );
        assert!(
            !yearly_dues_support(S::GoodStanding, MonthlyDuesStatus::Active)
                .contains(&YearlyDuesStatus::Active)
        );
        assert!(
            !yearly_dues_support(S::Lapsed, MonthlyDuesStatus::Lapsed)
                .contains(&YearlyDuesStatus::Active)
        );
    }

    #[test]
    fn test_add_years_leap_day() {
        assert_eq!(add_years(date!(2024 - 02 - 29), 1), date!(2025 - 02 - 28));
        assert_eq!(add_years(date!(2024 - 02 - 29), -1), date!(2023 - 02 - 28));
        assert_eq!(add_years(date!(2023 - 07 - 04), 1), date!(2024 - 07 - 04));
    }

    #[test]
    fn test_random_date_between_bounds() {
        let mut rng = StdRng::seed_from_u64(19);
        let start = date!(2020 - 01 - 01);
        let end = date!(2020 - 01 - 10);

        for _ in 0..200 {
            let d = random_date_between(start, end, &mut rng);
            assert!(d >= start && d <= end);
        }
        assert_eq!(random_date_between(end, start, &mut rng), end);
    }

    #[test]
    fn test_custom_districts() {
        let config = MemberGenConfig {
            congressional_districts: vec!["CA_12".to_string()],
            dsa_chapter: "San Francisco".to_string(),
            ..Default::default()
        };
        let mut member_gen = MemberGenerator::with_config(config).unwrap();
        let mut rng = StdRng::seed_from_u64(20);
        let member = member_gen.generate_on(TODAY, &mut rng);

        assert_eq!(member.congressional_district, "CA_12");
        assert_eq!(member.dsa_chapter, "San Francisco");
    }

    #[test]
    fn test_empty_district_list_rejected() {
        let config = MemberGenConfig {
            congressional_districts: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(
            MemberGenerator::with_config(config),
            Err(TableError::Empty)
        ));
    }
}
