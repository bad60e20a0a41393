use parking_macros::entity_id;

#[entity_id]
struct PassNo(String);

fn main() {
    let a = PassNo::new("MP-0001");
    let b: PassNo = "MP-0001".into();
    assert_eq!(a, b);
    assert_eq!(a.as_ref(), "MP-0001");

    let parsed: PassNo = "SP-0002".parse().unwrap();
    let _ = format!("{:?} {}", parsed, parsed);
}
