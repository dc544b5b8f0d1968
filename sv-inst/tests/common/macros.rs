#[macro_export]
macro_rules! svinst_fixture_tests {
    ($($name:ident => ($recorded:expr, $expected:expr)),+ $(,)?) => {
        $(
            #[test]
            fn $name() {
                $crate::common::assert_fixture_matches($recorded, $expected);
            }
        )+
    };
}
