/// Marker for fixed-layout value types that can be copied to and from raw bytes
/// without any transformation.
///
/// Prefer `#[derive(Blittable)]` over a manual implementation: the derive only
/// accepts `#[repr(C)]` or `#[repr(transparent)]` structs whose fields are all
/// `Blittable`, and rejects layouts with padding at compile time.
///
/// # Safety
/// Implementors must guarantee that:
/// - the type contains no pointers, references or other indirections
/// - the type has no padding bytes
/// - every bit pattern of `size_of::<Self>()` bytes is a valid value
pub unsafe trait Blittable: Copy + Send + Sync + 'static {
    /// Compile-time layout assertion, evaluated when the type is used in a
    /// generic context that references it.
    const LAYOUT_CHECK: () = ();
}

macro_rules! impl_blittable_for_primitive {
    ($($t:ty),*) => {
        $(
            unsafe impl Blittable for $t {}
        )*
    };
}

// bool and char are left out: not every bit pattern is valid.
// usize and isize are left out: their width depends on the target.
impl_blittable_for_primitive!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128, f32, f64);

unsafe impl<T: Blittable, const N: usize> Blittable for [T; N] {
    const LAYOUT_CHECK: () = T::LAYOUT_CHECK;
}

/// Byte size of one element of `T`, forcing its layout check.
#[inline(always)]
pub const fn size_of_blittable<T: Blittable>() -> usize {
    #[allow(clippy::let_unit_value)]
    let () = T::LAYOUT_CHECK;
    size_of::<T>()
}
