//! Source block parameter table.
//!
//! Each entry is (K', J, S, H, W). The table and the tuple generator form one
//! codebook: changing either changes every repair symbol, so they are
//! versioned together through [`CODEBOOK_VERSION`].

use crate::error::{FountainError, Result};
use serde::{Deserialize, Serialize};

pub const CODEBOOK_VERSION: u16 = 1;

/// Largest supported number of source symbols in one block.
pub const MAX_SOURCE_SYMBOLS: usize = 56403;

/// Block parameters derived from the number of source symbols.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeParameters {
    /// Padded source symbol count K'.
    pub k_prime: usize,
    /// Systematic index.
    pub j: usize,
    /// LDPC symbol count.
    pub s: usize,
    /// HDPC symbol count.
    pub h: usize,
    /// LT symbol count.
    pub w: usize,
}

impl CodeParameters {
    /// Parameters of the smallest table entry with K' >= `k`.
    pub fn for_source_count(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(FountainError::Config("source block needs at least one symbol".into()));
        }
        if k > MAX_SOURCE_SYMBOLS {
            return Err(FountainError::UnsupportedSize {
                requested: k,
                max: MAX_SOURCE_SYMBOLS,
            });
        }
        let idx = PARAMETER_TABLE.partition_point(|entry| (entry.0 as usize) < k);
        let &(k_prime, j, s, h, w) = PARAMETER_TABLE.get(idx).ok_or(FountainError::UnsupportedSize {
            requested: k,
            max: MAX_SOURCE_SYMBOLS,
        })?;
        Ok(Self {
            k_prime: k_prime as usize,
            j: j as usize,
            s: s as usize,
            h: h as usize,
            w: w as usize,
        })
    }

    /// Intermediate symbol count L = K' + S + H.
    pub fn l(&self) -> usize {
        self.k_prime + self.s + self.h
    }

    /// Permanently inactive symbol count P = L - W.
    pub fn p(&self) -> usize {
        self.l() - self.w
    }

    /// Smallest prime >= P.
    pub fn p1(&self) -> usize {
        next_prime(self.p())
    }

    /// LT columns outside the LDPC block.
    pub fn b(&self) -> usize {
        self.w - self.s
    }
}

pub(crate) fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

pub(crate) fn next_prime(mut n: usize) -> usize {
    while !is_prime(n) {
        n += 1;
    }
    n
}

/// Supported block sizes.
pub fn supported_sizes() -> impl Iterator<Item = usize> {
    PARAMETER_TABLE.iter().map(|e| e.0 as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_rounds_up() {
        let p = CodeParameters::for_source_count(1).unwrap();
        assert_eq!((p.k_prime, p.j, p.s, p.h, p.w), (10, 702, 7, 10, 17));
        assert_eq!(CodeParameters::for_source_count(10).unwrap().k_prime, 10);
        assert_eq!(CodeParameters::for_source_count(11).unwrap().k_prime, 12);
        let p = CodeParameters::for_source_count(149).unwrap();
        assert_eq!((p.k_prime, p.j, p.s, p.h, p.w), (150, 768, 23, 10, 173));
        assert_eq!(
            CodeParameters::for_source_count(MAX_SOURCE_SYMBOLS).unwrap().k_prime,
            MAX_SOURCE_SYMBOLS
        );
    }

    #[test]
    fn out_of_range_sizes() {
        assert!(matches!(
            CodeParameters::for_source_count(0),
            Err(FountainError::Config(_))
        ));
        assert!(matches!(
            CodeParameters::for_source_count(MAX_SOURCE_SYMBOLS + 1),
            Err(FountainError::UnsupportedSize { requested: 56404, max: MAX_SOURCE_SYMBOLS })
        ));
    }

    #[test]
    fn table_is_monotonic_and_consistent() {
        assert_eq!(PARAMETER_TABLE.len(), 355);
        assert!(PARAMETER_TABLE.windows(2).all(|w| w[0].0 < w[1].0));
        for &(k_prime, j, s, h, w) in PARAMETER_TABLE.iter() {
            let (k_prime, s, w) = (k_prime as usize, s as usize, w as usize);
            assert!(j < 1024);
            assert!(is_prime(s), "S = {s}");
            assert!(is_prime(w), "W = {w}");
            assert!(w <= k_prime + s);
            assert!((10..=16).contains(&h));
        }
    }

    #[test]
    fn derived_counts() {
        let p = CodeParameters::for_source_count(150).unwrap();
        assert_eq!(p.l(), 183);
        assert_eq!(p.p(), 10);
        assert_eq!(p.p1(), 11);
        assert_eq!(p.b(), 150);
    }
}

/// (K', J, S, H, W)
#[rustfmt::skip]
static PARAMETER_TABLE: [(u32, u16, u16, u8, u32); 355] = [
    (10, 702, 7, 10, 17),
    (12, 508, 7, 10, 19),
    (14, 532, 7, 10, 19),
    (16, 732, 11, 10, 23),
    (18, 976, 11, 10, 29),
    (20, 400, 11, 10, 31),
    (22, 249, 11, 10, 31),
    (24, 0, 11, 10, 31),
    (26, 232, 11, 10, 37),
    (28, 650, 11, 10, 37),
    (30, 891, 11, 10, 41),
    (32, 807, 11, 10, 43),
    (34, 301, 11, 10, 43),
    (36, 553, 11, 10, 47),
    (38, 943, 11, 10, 47),
    (40, 523, 11, 10, 47),
    (42, 550, 11, 10, 53),
    (44, 274, 11, 10, 53),
    (46, 755, 13, 10, 59),
    (48, 118, 13, 10, 61),
    (50, 708, 13, 10, 61),
    (52, 717, 13, 10, 61),
    (54, 528, 13, 10, 67),
    (56, 719, 13, 10, 67),
    (58, 983, 13, 10, 71),
    (60, 243, 13, 10, 73),
    (62, 431, 13, 10, 73),
    (64, 584, 13, 10, 73),
    (66, 413, 13, 10, 79),
    (68, 365, 17, 10, 83),
    (70, 51, 17, 10, 83),
    (72, 936, 17, 10, 89),
    (74, 634, 17, 10, 89),
    (76, 856, 17, 10, 89),
    (78, 561, 17, 10, 89),
    (80, 325, 17, 10, 97),
    (82, 820, 17, 10, 97),
    (84, 583, 17, 10, 101),
    (86, 437, 17, 10, 103),
    (88, 69, 17, 10, 103),
    (90, 34, 17, 10, 107),
    (92, 17, 17, 10, 109),
    (94, 690, 17, 10, 109),
    (96, 656, 17, 10, 113),
    (98, 200, 17, 10, 113),
    (100, 916, 17, 10, 113),
    (102, 804, 17, 10, 113),
    (105, 614, 17, 10, 113),
    (108, 408, 19, 10, 127),
    (111, 31, 19, 10, 127),
    (114, 860, 19, 10, 131),
    (117, 210, 19, 10, 131),
    (120, 117, 19, 10, 139),
    (123, 980, 19, 10, 139),
    (126, 358, 19, 10, 139),
    (129, 657, 19, 10, 139),
    (132, 270, 19, 10, 151),
    (135, 714, 19, 10, 151),
    (138, 537, 23, 10, 157),
    (141, 137, 23, 10, 163),
    (144, 598, 23, 10, 167),
    (147, 686, 23, 10, 167),
    (150, 768, 23, 10, 173),
    (153, 164, 23, 10, 173),
    (157, 364, 23, 10, 179),
    (161, 142, 23, 10, 181),
    (165, 38, 23, 10, 181),
    (169, 639, 23, 10, 191),
    (173, 518, 23, 10, 193),
    (177, 633, 23, 10, 199),
    (181, 331, 23, 10, 199),
    (185, 619, 23, 10, 199),
    (189, 916, 23, 10, 211),
    (193, 402, 23, 10, 211),
    (197, 735, 23, 10, 211),
    (201, 946, 29, 10, 229),
    (206, 510, 29, 10, 233),
    (211, 871, 29, 10, 239),
    (216, 754, 29, 10, 241),
    (221, 917, 29, 10, 241),
    (226, 1003, 29, 11, 251),
    (231, 481, 29, 11, 257),
    (236, 745, 29, 11, 263),
    (241, 775, 29, 11, 269),
    (246, 1015, 29, 11, 271),
    (251, 968, 29, 11, 277),
    (257, 547, 29, 11, 283),
    (263, 439, 29, 11, 283),
    (269, 451, 29, 11, 293),
    (275, 867, 29, 11, 293),
    (281, 210, 29, 11, 307),
    (287, 836, 29, 11, 313),
    (293, 533, 29, 11, 317),
    (299, 966, 29, 11, 317),
    (305, 60, 31, 11, 331),
    (312, 194, 31, 11, 337),
    (319, 756, 31, 11, 349),
    (326, 368, 31, 11, 353),
    (333, 489, 31, 11, 359),
    (340, 828, 31, 11, 367),
    (347, 702, 31, 11, 373),
    (354, 36, 37, 11, 389),
    (362, 805, 37, 11, 397),
    (370, 194, 37, 11, 401),
    (378, 948, 37, 11, 409),
    (386, 659, 37, 11, 421),
    (394, 381, 37, 11, 431),
    (402, 265, 37, 11, 439),
    (411, 751, 37, 11, 443),
    (420, 359, 37, 11, 457),
    (429, 205, 37, 12, 463),
    (438, 343, 37, 12, 467),
    (447, 43, 37, 12, 479),
    (456, 184, 37, 12, 491),
    (466, 977, 37, 12, 503),
    (476, 640, 37, 12, 509),
    (486, 78, 37, 12, 523),
    (496, 795, 37, 12, 523),
    (506, 174, 41, 12, 547),
    (517, 796, 41, 12, 557),
    (528, 917, 41, 12, 569),
    (539, 897, 41, 12, 577),
    (550, 980, 41, 12, 587),
    (561, 133, 41, 12, 601),
    (573, 865, 41, 12, 613),
    (585, 451, 41, 12, 619),
    (597, 297, 43, 12, 631),
    (609, 373, 43, 12, 647),
    (622, 645, 43, 12, 661),
    (635, 370, 47, 12, 677),
    (648, 865, 47, 12, 691),
    (661, 913, 47, 12, 701),
    (675, 469, 47, 12, 719),
    (689, 248, 47, 12, 733),
    (703, 639, 47, 12, 743),
    (718, 980, 47, 12, 761),
    (733, 732, 47, 12, 773),
    (748, 870, 53, 12, 797),
    (763, 47, 53, 12, 811),
    (779, 538, 53, 12, 829),
    (795, 463, 53, 12, 839),
    (811, 436, 53, 12, 863),
    (828, 547, 53, 12, 881),
    (845, 571, 53, 12, 887),
    (862, 901, 53, 12, 911),
    (880, 198, 53, 13, 929),
    (898, 793, 53, 13, 947),
    (916, 100, 59, 13, 971),
    (935, 587, 59, 13, 991),
    (954, 618, 59, 13, 1013),
    (974, 148, 59, 13, 1033),
    (994, 49, 59, 13, 1051),
    (1014, 457, 59, 13, 1069),
    (1035, 924, 59, 13, 1093),
    (1056, 699, 59, 13, 1109),
    (1078, 41, 59, 13, 1129),
    (1100, 446, 59, 13, 1153),
    (1122, 1011, 61, 13, 1181),
    (1145, 761, 61, 13, 1201),
    (1168, 780, 61, 13, 1229),
    (1192, 62, 67, 13, 1259),
    (1216, 930, 67, 13, 1283),
    (1241, 794, 67, 13, 1307),
    (1266, 610, 67, 13, 1327),
    (1292, 129, 67, 13, 1327),
    (1318, 368, 67, 13, 1381),
    (1345, 839, 67, 13, 1409),
    (1372, 781, 67, 13, 1439),
    (1400, 805, 71, 13, 1471),
    (1428, 614, 71, 13, 1499),
    (1457, 718, 71, 13, 1523),
    (1487, 196, 71, 13, 1553),
    (1517, 559, 73, 13, 1583),
    (1548, 584, 73, 13, 1621),
    (1579, 437, 73, 13, 1637),
    (1611, 947, 79, 13, 1669),
    (1644, 143, 79, 14, 1723),
    (1677, 355, 79, 14, 1753),
    (1711, 687, 79, 14, 1789),
    (1746, 726, 79, 14, 1823),
    (1781, 756, 79, 14, 1847),
    (1817, 409, 83, 14, 1889),
    (1854, 928, 83, 14, 1933),
    (1892, 335, 83, 14, 1973),
    (1930, 667, 83, 14, 2011),
    (1969, 780, 89, 14, 2053),
    (2009, 660, 89, 14, 2089),
    (2050, 943, 89, 14, 2137),
    (2091, 378, 89, 14, 2179),
    (2133, 898, 89, 14, 2221),
    (2176, 319, 89, 14, 2251),
    (2220, 902, 97, 14, 2311),
    (2265, 1019, 97, 14, 2357),
    (2311, 626, 97, 14, 2399),
    (2358, 921, 97, 14, 2447),
    (2406, 787, 97, 14, 2503),
    (2455, 570, 97, 14, 2551),
    (2505, 208, 101, 14, 2593),
    (2556, 158, 101, 14, 2657),
    (2608, 848, 101, 14, 2707),
    (2661, 70, 101, 14, 2753),
    (2715, 994, 103, 14, 2803),
    (2770, 769, 103, 14, 2861),
    (2826, 267, 107, 14, 2927),
    (2883, 328, 107, 14, 2971),
    (2941, 844, 109, 14, 3049),
    (3000, 769, 109, 14, 3109),
    (3060, 531, 113, 14, 3169),
    (3122, 655, 113, 14, 3229),
    (3185, 210, 113, 14, 3271),
    (3249, 308, 127, 14, 3373),
    (3314, 271, 127, 15, 3433),
    (3381, 334, 127, 15, 3499),
    (3449, 380, 127, 15, 3571),
    (3518, 1007, 127, 15, 3643),
    (3589, 522, 127, 15, 3709),
    (3661, 482, 127, 15, 3779),
    (3735, 751, 127, 15, 3853),
    (3810, 382, 127, 15, 3931),
    (3887, 33, 131, 15, 4013),
    (3965, 479, 131, 15, 4093),
    (4045, 462, 137, 15, 4177),
    (4126, 587, 137, 15, 4261),
    (4209, 720, 137, 15, 4339),
    (4294, 960, 137, 15, 4423),
    (4380, 834, 139, 15, 4519),
    (4468, 496, 149, 15, 4603),
    (4558, 77, 149, 15, 4703),
    (4650, 85, 149, 15, 4799),
    (4743, 864, 149, 15, 4889),
    (4838, 263, 149, 15, 4987),
    (4935, 179, 151, 15, 5081),
    (5034, 660, 157, 15, 5189),
    (5135, 434, 157, 15, 5281),
    (5238, 319, 157, 15, 5393),
    (5343, 853, 163, 15, 5503),
    (5450, 250, 163, 15, 5591),
    (5559, 176, 163, 15, 5717),
    (5671, 843, 167, 15, 5827),
    (5785, 675, 167, 15, 5939),
    (5901, 987, 173, 15, 6073),
    (6020, 968, 173, 15, 6173),
    (6141, 299, 179, 15, 6317),
    (6264, 580, 179, 16, 6427),
    (6390, 566, 179, 16, 6569),
    (6518, 36, 181, 16, 6691),
    (6649, 120, 191, 16, 6833),
    (6782, 440, 191, 16, 6971),
    (6918, 271, 191, 16, 7109),
    (7057, 620, 191, 16, 7247),
    (7199, 168, 193, 16, 7369),
    (7343, 927, 197, 16, 7537),
    (7490, 388, 199, 16, 7687),
    (7640, 461, 211, 16, 7841),
    (7793, 667, 211, 16, 7993),
    (7949, 730, 211, 16, 8147),
    (8108, 743, 211, 16, 8317),
    (8271, 121, 223, 16, 8467),
    (8437, 726, 223, 16, 8647),
    (8606, 404, 223, 16, 8821),
    (8779, 253, 223, 16, 9001),
    (8955, 504, 227, 16, 9181),
    (9135, 161, 229, 16, 9349),
    (9318, 477, 233, 16, 9551),
    (9505, 691, 239, 16, 9743),
    (9696, 679, 239, 16, 9931),
    (9890, 773, 241, 16, 10111),
    (10088, 865, 251, 16, 10337),
    (10290, 451, 251, 16, 10531),
    (10496, 21, 251, 16, 10739),
    (10706, 924, 257, 16, 10957),
    (10921, 280, 263, 16, 11177),
    (11140, 711, 263, 16, 11399),
    (11363, 182, 269, 16, 11621),
    (11591, 1014, 269, 16, 11839),
    (11823, 517, 277, 16, 12097),
    (12060, 855, 277, 16, 12329),
    (12302, 827, 283, 16, 12583),
    (12549, 386, 293, 16, 12841),
    (12800, 376, 293, 16, 13093),
    (13056, 853, 307, 16, 13339),
    (13318, 548, 307, 16, 13619),
    (13585, 623, 307, 16, 13883),
    (13857, 210, 307, 16, 14159),
    (14135, 845, 311, 16, 14437),
    (14418, 427, 317, 16, 14731),
    (14707, 292, 331, 16, 15031),
    (15002, 181, 331, 16, 15331),
    (15303, 238, 331, 16, 15629),
    (15610, 481, 337, 16, 15937),
    (15923, 576, 347, 16, 16267),
    (16242, 566, 347, 16, 16573),
    (16567, 257, 349, 16, 16903),
    (16899, 354, 359, 16, 17257),
    (17237, 129, 367, 16, 17599),
    (17582, 245, 367, 16, 17939),
    (17934, 63, 373, 16, 18307),
    (18293, 748, 379, 16, 18671),
    (18659, 1020, 383, 16, 19037),
    (19033, 286, 389, 16, 19421),
    (19414, 394, 397, 16, 19801),
    (19803, 677, 401, 16, 20201),
    (20200, 47, 409, 16, 20599),
    (20604, 120, 419, 16, 21023),
    (21017, 295, 419, 16, 21433),
    (21438, 932, 431, 16, 21863),
    (21867, 164, 431, 16, 22291),
    (22305, 588, 439, 16, 22741),
    (22752, 620, 443, 16, 23189),
    (23208, 421, 449, 16, 23633),
    (23673, 853, 457, 16, 24121),
    (24147, 5, 463, 16, 24593),
    (24630, 898, 479, 16, 25097),
    (25123, 407, 479, 16, 25601),
    (25626, 310, 487, 16, 26113),
    (26139, 332, 499, 16, 26633),
    (26662, 90, 499, 16, 27143),
    (27196, 612, 509, 16, 27701),
    (27740, 892, 521, 16, 28229),
    (28295, 255, 523, 16, 28817),
    (28861, 469, 541, 16, 29401),
    (29439, 191, 541, 16, 29959),
    (30028, 701, 547, 16, 30559),
    (30629, 824, 557, 16, 31183),
    (31242, 22, 569, 16, 31799),
    (31867, 145, 577, 16, 32443),
    (32505, 339, 587, 16, 33091),
    (33156, 437, 593, 16, 33749),
    (33820, 314, 601, 16, 34421),
    (34497, 239, 613, 16, 35107),
    (35187, 735, 619, 16, 35803),
    (35891, 797, 631, 16, 36497),
    (36609, 78, 641, 16, 37243),
    (37342, 601, 653, 16, 37993),
    (38089, 645, 659, 16, 38747),
    (38851, 239, 673, 16, 39521),
    (39629, 970, 683, 16, 40289),
    (40422, 653, 691, 16, 41113),
    (41231, 158, 701, 16, 41927),
    (42056, 710, 719, 16, 42773),
    (42898, 845, 727, 16, 43613),
    (43756, 811, 739, 16, 44491),
    (44632, 447, 751, 16, 45377),
    (45525, 32, 761, 16, 46279),
    (46436, 55, 773, 16, 47207),
    (47365, 8, 787, 16, 48131),
    (48313, 264, 797, 16, 49109),
    (49280, 184, 809, 16, 50087),
    (50266, 3, 821, 16, 51071),
    (51272, 239, 839, 16, 52103),
    (52298, 450, 853, 16, 53149),
    (53344, 22, 863, 16, 54193),
    (54411, 359, 877, 16, 55259),
    (55500, 788, 907, 16, 56401),
    (56403, 640, 907, 16, 57301),
];
