#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;
use std::sync::OnceLock;

static HAS_AVX2: OnceLock<bool> = OnceLock::new();

#[inline]
fn has_avx2() -> bool {
    *HAS_AVX2.get_or_init(|| {
        #[cfg(target_arch = "x86_64")]
        {
            is_x86_feature_detected!("avx2")
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            false
        }
    })
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
pub unsafe fn find_char_avx2(data: &[u8], target: u8, start: usize) -> Option<usize> {
    let target_vec = _mm256_set1_epi8(target as i8);
    let slice = &data[start..];

    let chunks = slice.chunks_exact(32);
    let remainder = chunks.remainder();

    for (chunk_idx, chunk) in chunks.enumerate() {
        let vector = _mm256_loadu_si256(chunk.as_ptr() as *const __m256i);
        let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi8(vector, target_vec));

        if mask != 0 {
            return Some(start + chunk_idx * 32 + mask.trailing_zeros() as usize);
        }
    }

    let remainder_start = slice.len() - remainder.len();
    remainder
        .iter()
        .position(|&b| b == target)
        .map(|i| start + remainder_start + i)
}

#[inline]
pub fn find_char(data: &[u8], target: u8, start: usize) -> Option<usize> {
    if start >= data.len() {
        return None;
    }

    #[cfg(target_arch = "x86_64")]
    {
        if has_avx2() {
            return unsafe { find_char_avx2(data, target, start) };
        }
    }

    memchr::memchr(target, &data[start..]).map(|i| start + i)
}

#[inline]
pub fn contains_char(data: &[u8], target: u8) -> bool {
    memchr::memchr(target, data).is_some()
}
