//! Attack tables for move generation.
//!
//! Uses Hyperbola Quintessence for sliding piece attacks (bishop, rook, queen).
//! This is a fast, branch-free algorithm that uses the `o^(o-2r)` trick.

#![allow(clippy::needless_range_loop)] // Index loops are clearer for board coordinates

mod tables;

pub(crate) use tables::{KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS};

use once_cell::sync::Lazy;

const FILE_A: u64 = 0x0101010101010101;

fn ray_mask(sq: usize, dr: isize, df: isize) -> u64 {
    let mut mask = 0u64;
    for dir in [1isize, -1] {
        let mut r = (sq / 8) as isize;
        let mut f = (sq % 8) as isize;
        loop {
            r += dr * dir;
            f += df * dir;
            if !(0..8).contains(&r) || !(0..8).contains(&f) {
                break;
            }
            mask |= 1u64 << (r * 8 + f);
        }
    }
    mask | (1u64 << sq)
}

/// Diagonal masks for each square (bottom-left to top-right direction)
static DIAG_MASKS: Lazy<[u64; 64]> = Lazy::new(|| {
    let mut masks = [0u64; 64];
    for sq in 0..64 {
        masks[sq] = ray_mask(sq, 1, 1);
    }
    masks
});

/// Anti-diagonal masks for each square (top-left to bottom-right direction)
static ANTI_MASKS: Lazy<[u64; 64]> = Lazy::new(|| {
    let mut masks = [0u64; 64];
    for sq in 0..64 {
        masks[sq] = ray_mask(sq, 1, -1);
    }
    masks
});

/// Rank attack lookup table: `[8 * occupancy_6bit + file]` -> attacks on that rank
/// Only stores attacks for file positions, shifted to rank 0
static RANK_ATTACKS: Lazy<[u64; 512]> = Lazy::new(|| {
    let mut attacks = [0u64; 512];
    for occ_6bit in 0..64 {
        for file in 0..8 {
            let mut attack = 0u64;
            for f in (file + 1)..8 {
                attack |= 1u64 << f;
                // occupancy bits 0-5 stand for files b-g
                if (1..=6).contains(&f) && (occ_6bit & (1 << (f - 1))) != 0 {
                    break;
                }
            }
            for f in (0..file).rev() {
                attack |= 1u64 << f;
                if (1..=6).contains(&f) && (occ_6bit & (1 << (f - 1))) != 0 {
                    break;
                }
            }
            attacks[8 * occ_6bit + file] = attack;
        }
    }
    attacks
});

/// Hyperbola Quintessence for one line through `square`; byteswap handles the reverse ray.
#[inline]
fn hyp_quint(occupied: u64, mask: u64, square: usize) -> u64 {
    let piece_bit = 1u64 << square;
    let forward = occupied & mask & !piece_bit;
    let backward = forward.swap_bytes();
    let forward_attacks = forward.wrapping_sub(piece_bit.wrapping_mul(2));
    let backward_attacks = backward
        .wrapping_sub(piece_bit.swap_bytes().wrapping_mul(2))
        .swap_bytes();
    (forward_attacks ^ backward_attacks) & mask & !piece_bit
}

#[inline]
fn file_attacks(occupied: u64, square: usize) -> u64 {
    hyp_quint(occupied, FILE_A << (square % 8), square)
}

/// Rank attacks use a lookup table since byteswap cannot reverse within a rank
#[inline]
fn rank_attacks(occupied: u64, square: usize) -> u64 {
    let rank = square / 8;
    let file = square % 8;
    let occ_6bit = ((occupied >> (rank * 8 + 1)) & 63) as usize;
    RANK_ATTACKS[8 * occ_6bit + file] << (rank * 8)
}

/// Get bishop attacks (diagonals only)
#[inline]
pub(crate) fn bishop_attacks(square: usize, occupancy: u64) -> u64 {
    hyp_quint(occupancy, DIAG_MASKS[square], square) | hyp_quint(occupancy, ANTI_MASKS[square], square)
}

/// Get rook attacks (ranks and files only)
#[inline]
pub(crate) fn rook_attacks(square: usize, occupancy: u64) -> u64 {
    file_attacks(occupancy, square) | rank_attacks(occupancy, square)
}

/// Get queen attacks (all 8 directions)
#[inline]
pub(crate) fn queen_attacks(square: usize, occupancy: u64) -> u64 {
    bishop_attacks(square, occupancy) | rook_attacks(square, occupancy)
}
