/// Declare numeric replies. Each entry becomes a unit struct whose `new`
/// function formats the arguments into an [`UntargetedNumeric`](super::UntargetedNumeric).
macro_rules! define_numerics {
    ( $( $code:literal ( $name:ident ) => { ( $( $arg:ident : $ty:ty ),* ) => $fmt:literal } ),* $(,)? ) => {
        $(
            pub struct $name;

            impl $name
            {
                #[allow(clippy::new_ret_no_self)]
                pub fn new( $( $arg : $ty ),* ) -> $crate::messages::UntargetedNumeric
                {
                    $crate::messages::UntargetedNumeric::new(stringify!($code), format!($fmt $(, $arg = $arg)*))
                }
            }
        )*
    };
}

/// Declare named protocol messages. Each entry becomes a unit struct whose
/// `new` function formats a complete [`OutboundClientMessage`](super::OutboundClientMessage).
macro_rules! define_messages {
    ( $( $name:ident => { ( $( $arg:ident : $ty:ty ),* ) => $fmt:literal } ),* $(,)? ) => {
        $(
            pub struct $name;

            impl $name
            {
                #[allow(clippy::new_ret_no_self)]
                pub fn new( $( $arg : $ty ),* ) -> $crate::messages::OutboundClientMessage
                {
                    $crate::messages::OutboundClientMessage::new(format!($fmt $(, $arg = $arg)*))
                }
            }
        )*
    };
}
