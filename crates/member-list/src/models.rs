//! Record types shared by the member sampler, the address resolver, and the writers.

use serde::{Serialize, Serializer};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const ISO_DATE: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Declares a categorical column: an enum whose variants map to the exact
/// labels found in national membership exports.
macro_rules! category {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in export order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

category! {
    /// Standing derived from the expiration date.
    MembershipStatus {
        GoodStanding => "Member in Good Standing",
        Member => "Member",
        Lapsed => "Lapsed",
    }
}

impl MembershipStatus {
    pub fn is_good_standing(&self) -> bool {
        matches!(self, Self::GoodStanding)
    }

    /// Single-letter status used by the national list ("M" or "L").
    pub fn letter(&self) -> StatusLetter {
        if self.as_str().starts_with("Member") {
            StatusLetter::M
        } else {
            StatusLetter::L
        }
    }
}

category! {
    StatusLetter {
        M => "M",
        L => "L",
    }
}

category! {
    MembershipType {
        Unspecified => "",
        OneTime => "one-time",
        Yearly => "yearly",
        Annual => "annual",
        Monthly => "monthly",
        IncomeBased => "income-based",
    }
}

category! {
    MonthlyDuesStatus {
        Active => "active",
        Lapsed => "lapsed",
        PastDue => "past_due",
        CanceledByProcessor => "canceled_by_processor",
        CanceledByAdmin => "canceled_by_admin",
        CanceledByFailure => "canceled_by_failure",
    }
}

category! {
    YearlyDuesStatus {
        Unspecified => "",
        Active => "active",
        Never => "never",
        CanceledByUser => "canceled_by_user",
        CanceledByProcessor => "canceled_by_processor",
        CanceledByAdmin => "canceled_by_admin",
        CanceledByFailure => "canceled_by_failure",
    }
}

category! {
    /// Answer to the union membership question on the join form.
    UnionMember {
        Unspecified => "",
        Current => "Yes, current union member",
        Retired => "Yes, retired union member",
        Former => "No, but former union member",
        NotMember => "No, not a union member",
        Organizing => "Currently organizing my workplace",
    }
}

impl UnionMember {
    /// True for the answers that name a union ("Yes, ...").
    pub fn is_member(&self) -> bool {
        self.as_str().starts_with("Yes")
    }
}

category! {
    Race {
        Asian => "Asian",
        Black => "Black / of African Descent",
        Hispanic => "Hispanic / Latinx",
        Jewish => "Jewish",
        NativeAmerican => "Native American / Indigenous",
        Other => "Other",
        PacificIslander => "Pacific Islander",
        PreferNotToSay => "Prefer Not to Say",
        WestAsian => "West Asian / Middle Eastern",
        White => "White / of European Descent",
    }
}

category! {
    StudentStatus {
        Unspecified => "",
        No => "No",
        College => "Yes, college student",
        HighSchool => "Yes, high school student",
        Graduate => "Yes, graduate student",
    }
}

impl StudentStatus {
    pub fn is_student(&self) -> bool {
        self.as_str().starts_with("Yes")
    }
}

category! {
    MailingPreference {
        Yes => "Yes",
        No => "No",
        CardOnly => "Membership card only",
    }
}

/// One synthetic member, without an address.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecord {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub do_not_call: bool,
    pub p2ptext_optout: bool,
    pub mobile_phone: String,
    pub home_phone: String,
    pub work_phone: String,
    pub best_phone: String,
    pub join_date: Date,
    /// Expiration date.
    pub xdate: Date,
    pub membership_status: MembershipStatus,
    pub memb_status_letter: StatusLetter,
    pub membership_type: MembershipType,
    pub monthly_dues_status: MonthlyDuesStatus,
    pub yearly_dues_status: YearlyDuesStatus,
    pub union_member: UnionMember,
    pub union_name: String,
    pub union_local: Option<u16>,
    pub accomodations: String,
    pub race: Race,
    pub student_yes_no: StudentStatus,
    pub student_school_name: String,
    pub mailing_pref: MailingPreference,
    pub actionkit_id: u32,
    pub dsa_chapter: String,
    pub ydsa_chapter: String,
    pub congressional_district: String,
}

/// A postal address, either fabricated or resolved through a geocoder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Address {
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Flat output row: member columns followed by address columns.
///
/// Column names and order match the national membership list export.
#[derive(Debug, Clone, Serialize)]
pub struct RosterRow {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub do_not_call: &'static str,
    pub p2ptext_optout: &'static str,
    pub mobile_phone: String,
    pub home_phone: String,
    pub work_phone: String,
    pub best_phone: String,
    pub join_date: String,
    pub xdate: String,
    pub membership_status: MembershipStatus,
    pub memb_status_letter: StatusLetter,
    pub membership_type: MembershipType,
    pub monthly_dues_status: MonthlyDuesStatus,
    pub yearly_dues_status: YearlyDuesStatus,
    pub union_member: UnionMember,
    pub union_name: String,
    pub union_local: Option<u16>,
    pub accomodations: String,
    pub race: Race,
    pub student_yes_no: StudentStatus,
    pub student_school_name: String,
    pub mailing_pref: MailingPreference,
    pub actionkit_id: u32,
    pub dsa_chapter: String,
    pub ydsa_chapter: String,
    pub congressional_district: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl RosterRow {
    /// Header row, in field order.
    pub const COLUMNS: [&'static str; 37] = [
        "first_name",
        "middle_name",
        "last_name",
        "email",
        "do_not_call",
        "p2ptext_optout",
        "mobile_phone",
        "home_phone",
        "work_phone",
        "best_phone",
        "join_date",
        "xdate",
        "membership_status",
        "memb_status_letter",
        "membership_type",
        "monthly_dues_status",
        "yearly_dues_status",
        "union_member",
        "union_name",
        "union_local",
        "accomodations",
        "race",
        "student_yes_no",
        "student_school_name",
        "mailing_pref",
        "actionkit_id",
        "dsa_chapter",
        "ydsa_chapter",
        "congressional_district",
        "address1",
        "address2",
        "city",
        "state",
        "zip",
        "country",
        "lat",
        "lon",
    ];

    /// Merges a member and its address into one row.
    pub fn new(member: MemberRecord, address: Address) -> Self {
        Self {
            first_name: member.first_name,
            middle_name: member.middle_name,
            last_name: member.last_name,
            email: member.email,
            do_not_call: if member.do_not_call { "True" } else { "" },
            p2ptext_optout: if member.p2ptext_optout { "TRUE" } else { "" },
            mobile_phone: member.mobile_phone,
            home_phone: member.home_phone,
            work_phone: member.work_phone,
            best_phone: member.best_phone,
            join_date: iso_date(member.join_date),
            xdate: iso_date(member.xdate),
            membership_status: member.membership_status,
            memb_status_letter: member.memb_status_letter,
            membership_type: member.membership_type,
            monthly_dues_status: member.monthly_dues_status,
            yearly_dues_status: member.yearly_dues_status,
            union_member: member.union_member,
            union_name: member.union_name,
            union_local: member.union_local,
            accomodations: member.accomodations,
            race: member.race,
            student_yes_no: member.student_yes_no,
            student_school_name: member.student_school_name,
            mailing_pref: member.mailing_pref,
            actionkit_id: member.actionkit_id,
            dsa_chapter: member.dsa_chapter,
            ydsa_chapter: member.ydsa_chapter,
            congressional_district: member.congressional_district,
            address1: address.address1,
            address2: address.address2,
            city: address.city,
            state: address.state,
            zip: address.zip,
            country: address.country,
            lat: address.lat,
            lon: address.lon,
        }
    }
}

/// Formats a date as `YYYY-MM-DD`.
pub fn iso_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_status_letter() {
        assert_eq!(MembershipStatus::GoodStanding.letter(), StatusLetter::M);
        assert_eq!(MembershipStatus::Member.letter(), StatusLetter::M);
        assert_eq!(MembershipStatus::Lapsed.letter(), StatusLetter::L);
    }

    #[test]
    fn test_yes_prefixed_answers() {
        let members: Vec<_> = UnionMember::ALL.iter().filter(|u| u.is_member()).collect();
        assert_eq!(members, vec![&UnionMember::Current, &UnionMember::Retired]);

        let students = StudentStatus::ALL.iter().filter(|s| s.is_student()).count();
        assert_eq!(students, 3);
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(iso_date(date!(1982 - 06 - 01)), "1982-06-01");
        assert_eq!(iso_date(date!(2099 - 11 - 01)), "2099-11-01");
    }
}
