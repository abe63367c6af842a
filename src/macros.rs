/// Builds a [`Value`](crate::Value) tree from a JSON-like literal.
///
/// ```rust
/// use cfgish::cfgish;
///
/// let cfg = cfgish!({
///     "name": "server",
///     "port": 8080,
///     "debug": false,
///     "tags": ["alpha", "beta"],
/// });
///
/// assert_eq!(cfg.get("port").unwrap().as_int().unwrap(), 8080);
/// assert_eq!(cfg.get("tags").unwrap().array_len().unwrap(), 2);
/// ```
#[macro_export]
macro_rules! cfgish {
    (null) => {
        $crate::Value::null()
    };

    (true) => {
        $crate::Value::from(true)
    };

    (false) => {
        $crate::Value::from(false)
    };

    ([]) => {
        $crate::Value::array()
    };

    ([ $($element:tt),* $(,)? ]) => {
        $crate::Value::from(vec![$($crate::cfgish!($element)),*])
    };

    ({}) => {
        $crate::Value::object()
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::ObjectMap::new();
        $(
            object.insert($key.to_string(), $crate::cfgish!($value));
        )*
        $crate::Value::from(object)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}
