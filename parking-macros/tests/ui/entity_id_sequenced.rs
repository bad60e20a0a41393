use parking_macros::entity_id;

#[entity_id(prefix = "TKT")]
struct TicketNo(u32);

#[entity_id(prefix = "BAY", debug = false)]
struct BayNo(u16);

impl std::fmt::Debug for BayNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BayNo(..)")
    }
}

fn main() {
    let first = TicketNo::first();
    let second = first.next();
    assert!(second > first);
    assert_eq!(second.sequence(), 2);
    assert_eq!(TicketNo::PREFIX, "TKT");

    // Copy 派生可用
    let copied = second;
    let _ = format!("{:?} {}", copied, second);

    let _ = format!("{:?}", BayNo::from_sequence(7));
}
