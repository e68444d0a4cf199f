/*!

This is the long-form manual for `contest_points` and `contestpoll`.

## Input formats

All the inputs of a contest year live in the raw data directory and are
prefixed with the year.

### `{year}_countries.txt`

The authoritative list of voting countries of that year, one per line. Only
the first tab-separated field of a line is read; blank lines are ignored.

The votes file lays its columns out in the alphabetical order of this list,
ignoring case, followed by the `Rest of the World` bucket that gathers the
votes of every country that is not listed.

### `{year}_points.txt`

One contestant per line, tab separated:

```text
Sweden	351	12	0	8	...
```

The first field is the contestant, the second one the declared total, and
the following ones the votes given by each voting country, in the column
order described above.

Missing or unreadable numbers count as 0. In particular a line that stops
early gives 0 to all the remaining voting countries. This is on purpose: the
published files are not always complete and the program does not try to
guess.

### `{year}_poll.txt`

The polling made before the contest. Lines alternate between a vote count
(`1,204` or `1204`) and the name of the contestant:

```text
1,204
Sweden
877
Italy
```

## Intermediate results

`contestpoll compile` writes `{year}_points.json` to the results directory:
a JSON object from voting country to an object from contestant to votes.
The order of the keys is the order of the columns and of the lines of the
input, and it is the order used to break ties when allocating points.

## Configuration

`contestpoll --config settings.json` reads the directories and the years to
process from a JSON file:

```json
{
  "rawDataDir": "raw_data",
  "resultsDir": "results",
  "figuresDir": "figures",
  "firstYear": 2021,
  "lastYear": 2025,
  "excludedCountries": ["Ukraine"],
  "outlierThreshold": 2.0
}
```

All the fields are optional. The directories can also be set on the command
line, which takes precedence over the file.

*/
