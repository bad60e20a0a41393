use parking_macros::value_object;

#[value_object]
struct Amount {
    cents: i64,
}

#[value_object(default = false)]
#[derive(Copy, Hash)]
enum Tier {
    Standard,
    Premium,
}

#[value_object(debug = false)]
struct Opaque(i32);

fn main() {
    // Debug/Default/Clone/PartialEq 默认可用
    let a = Amount::default();
    let _ = format!("{:?}", a.clone());
    let _eq = a == Amount { cents: 0 };

    // 关闭 Default 后仍保留其余派生
    let t = Tier::Premium;
    let _ = format!("{:?}", t);
    let _ne = t != Tier::Standard;

    let _ = Opaque(1) == Opaque::default();
}
