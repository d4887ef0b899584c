/// Registers components for [InventoryDiscovery](crate::discovery::InventoryDiscovery)
///
/// The components are discovered at the module path of the invocation and
/// every module above it.
///
/// ```
/// mod services {
///     use weave_di::{Component, Constructor};
///
///     #[derive(Default)]
///     pub struct Clock;
///     impl Component for Clock {
///         fn constructor() -> Constructor<Self> {
///             Constructor::default()
///         }
///     }
///
///     weave_di::register_component!(Clock);
/// }
/// # fn main() {}
/// ```
#[macro_export]
macro_rules! register_component {
    ($($component:ty),+ $(,)?) => {
        $(
            $crate::inventory::submit! {
                $crate::discovery::Registration::new(
                    module_path!(),
                    ::std::any::type_name::<$component>,
                    <$component as $crate::component::Component>::descriptor,
                )
            }
        )+
    };
}
