#[macro_export]
macro_rules! bitmap {
    ( $( $bit:expr ),* ) => {
        {
            #[allow(unused_mut)]
            let mut map = $crate::BitMap::new();
            $( map.insert($bit); )*
            map
        }
    };
    ( $( $bit:expr ),+ , ) => {
        $crate::bitmap!( $( $bit ),+ )
    };
}
