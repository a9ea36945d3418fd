//! Built-in challenges
//!
//! Every challenge reads from stdin and writes to stdout.

use std::collections::BTreeMap;

use crate::{
    constants::languages,
    models::{Challenge, Difficulty, TestCase},
};

const JS_STDIN: &str = "const input = require('fs').readFileSync(0, 'utf8').trim();\n";
const PY_STDIN: &str = "import sys\n\ndata = sys.stdin.read().strip()\n";

fn starter(js_body: &str, py_body: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            languages::JAVASCRIPT.to_string(),
            format!("{JS_STDIN}\n{js_body}"),
        ),
        (languages::PYTHON.to_string(), format!("{PY_STDIN}\n{py_body}")),
    ])
}

pub(super) fn challenges() -> Vec<Challenge> {
    vec![
        Challenge {
            id: "two-sum".to_string(),
            title: "Two Sum".to_string(),
            description: "The first line holds space-separated integers, the second a target. \
                Print the indices of the two numbers that add up to the target, \
                smaller index first."
                .to_string(),
            difficulty: Difficulty::Easy,
            test_cases: vec![
                TestCase::new("2 7 11 15\n9", "0 1"),
                TestCase::new("3 2 4\n6", "1 2"),
                TestCase::new("3 3\n6", "0 1"),
            ],
            starter_code: starter(
                "function twoSum(nums, target) {\n  // your code here\n}\n",
                "def two_sum(nums, target):\n    # your code here\n    pass\n",
            ),
            time_limit_secs: 600,
        },
        Challenge {
            id: "reverse-string".to_string(),
            title: "Reverse String".to_string(),
            description: "Print the input line reversed.".to_string(),
            difficulty: Difficulty::Easy,
            test_cases: vec![
                TestCase::new("hello", "olleh"),
                TestCase::new("racecar", "racecar"),
                TestCase::new("CodeDuel", "leuDedoC"),
            ],
            starter_code: starter(
                "function reverse(s) {\n  // your code here\n}\n",
                "def reverse(s):\n    # your code here\n    pass\n",
            ),
            time_limit_secs: 300,
        },
        Challenge {
            id: "fizzbuzz".to_string(),
            title: "FizzBuzz".to_string(),
            description: "Given n, print the numbers 1..n one per line, replacing multiples \
                of 3 with Fizz, multiples of 5 with Buzz and multiples of both with FizzBuzz."
                .to_string(),
            difficulty: Difficulty::Easy,
            test_cases: vec![
                TestCase::new("3", "1\n2\nFizz"),
                TestCase::new("5", "1\n2\nFizz\n4\nBuzz"),
                TestCase::new(
                    "15",
                    "1\n2\nFizz\n4\nBuzz\nFizz\n7\n8\nFizz\nBuzz\n11\nFizz\n13\n14\nFizzBuzz",
                ),
            ],
            starter_code: starter(
                "function fizzBuzz(n) {\n  // your code here\n}\n",
                "def fizz_buzz(n):\n    # your code here\n    pass\n",
            ),
            time_limit_secs: 300,
        },
        Challenge {
            id: "palindrome-number".to_string(),
            title: "Palindrome Number".to_string(),
            description: "Print true if the integer reads the same backwards, false otherwise."
                .to_string(),
            difficulty: Difficulty::Easy,
            test_cases: vec![
                TestCase::new("121", "true"),
                TestCase::new("-121", "false"),
                TestCase::new("10", "false"),
            ],
            starter_code: starter(
                "function isPalindrome(x) {\n  // your code here\n}\n",
                "def is_palindrome(x):\n    # your code here\n    pass\n",
            ),
            time_limit_secs: 300,
        },
        Challenge {
            id: "max-subarray".to_string(),
            title: "Maximum Subarray".to_string(),
            description: "Print the largest sum of any non-empty contiguous subarray of the \
                space-separated integers."
                .to_string(),
            difficulty: Difficulty::Medium,
            test_cases: vec![
                TestCase::new("-2 1 -3 4 -1 2 1 -5 4", "6"),
                TestCase::new("1", "1"),
                TestCase::new("5 4 -1 7 8", "23"),
                TestCase::new("-3 -1 -2", "-1"),
            ],
            starter_code: starter(
                "function maxSubArray(nums) {\n  // your code here\n}\n",
                "def max_sub_array(nums):\n    # your code here\n    pass\n",
            ),
            time_limit_secs: 900,
        },
    ]
}
